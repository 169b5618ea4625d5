//! Index transfer pipeline orchestration.
//!
//! Sequencing: configuration bundle first, then data, page by page. The
//! page loop is a single sequential pull loop: the next page is not
//! requested until the current page has been transformed and durably
//! written. End of stream can therefore only be observed after the last
//! write completed, which keeps the final count accurate and bounds the
//! pipeline to one page in flight.

use std::sync::Arc;
use tracing::info;

use crate::bundle::transfer_config;
use crate::client::{IndexClient, RestClient};
use crate::config::IndexRef;
use crate::error::Result;
use crate::export::{ExportCursor, ExportOptions};
use crate::progress::{NullProgress, ProgressSink};
use crate::transform::{transform_page, Identity, RecordTransform};
use crate::writer::BatchWriter;

/// Summary of a completed transfer run.
#[derive(Debug, Default, Clone)]
pub struct TransferReport {
    /// Records written to the destination.
    pub records_transferred: u64,
    /// Pages processed.
    pub pages: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl TransferReport {
    /// Calculate throughput (records per second).
    #[must_use]
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.records_transferred as f64 / self.duration_secs
        } else {
            0.0
        }
    }
}

/// Transfer pipeline for one source index and one destination index.
pub struct TransferPipeline {
    source: Arc<dyn IndexClient>,
    destination: Arc<dyn IndexClient>,
    source_index: String,
    destination_index: String,
    transform: Box<dyn RecordTransform>,
    progress: Box<dyn ProgressSink>,
    options: ExportOptions,
}

impl TransferPipeline {
    /// Creates a pipeline with the identity transform and no progress
    /// output.
    pub fn new(
        source: Arc<dyn IndexClient>,
        destination: Arc<dyn IndexClient>,
        source_index: impl Into<String>,
        destination_index: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination,
            source_index: source_index.into(),
            destination_index: destination_index.into(),
            transform: Box::new(Identity),
            progress: Box::new(NullProgress),
            options: ExportOptions::default(),
        }
    }

    /// Creates a pipeline connecting two index references over REST.
    pub fn between(source: &IndexRef, destination: &IndexRef) -> Result<Self> {
        Ok(Self::new(
            Arc::new(RestClient::new(&source.endpoint, &source.api_key)?),
            Arc::new(RestClient::new(&destination.endpoint, &destination.api_key)?),
            &source.index,
            &destination.index,
        ))
    }

    /// Injects a per-record transformation hook.
    #[must_use]
    pub fn with_transform(mut self, transform: Box<dyn RecordTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Injects a progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Sets export options (attribute filter, page size).
    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the transfer: configuration, then data.
    ///
    /// Resolves with a summary, or rejects with the first encountered
    /// error. A configuration failure aborts before any export call; a
    /// mid-stream failure leaves already-written pages committed.
    pub async fn run(&self) -> Result<TransferReport> {
        let start = std::time::Instant::now();

        info!(
            "Starting index transfer: {} -> {}",
            self.source_index, self.destination_index
        );

        // Configuration must exist before data: records indexed against
        // stale settings would be ranked and faceted wrong.
        transfer_config(
            &*self.source,
            &self.source_index,
            &*self.destination,
            &self.destination_index,
        )
        .await?;

        let mut cursor =
            ExportCursor::open(&*self.source, &self.source_index, self.options.clone());
        let mut writer = BatchWriter::new(&*self.destination, &self.destination_index);
        let mut pages = 0u64;

        while let Some(page) = cursor.next_page().await? {
            if page.records.is_empty() {
                continue;
            }
            pages += 1;

            let transformed = transform_page(&*self.transform, page.records)?;
            let total = writer.write_page(&transformed).await?;
            self.progress.on_page(total);
        }

        let records_transferred = writer.written();
        self.progress.on_complete(records_transferred);

        let report = TransferReport {
            records_transferred,
            pages,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            "Transfer complete: {} records in {} pages over {:.2}s ({:.0} rec/sec)",
            report.records_transferred,
            report.pages,
            report.duration_secs,
            report.throughput()
        );

        Ok(report)
    }
}
