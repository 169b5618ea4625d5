//! Batched destination writes with a running transferred count.

use tracing::debug;

use crate::client::{IndexClient, Record};
use crate::error::{Error, Result};

/// Writes transformed pages to the destination index.
///
/// One write call per page; the page size is assumed compatible with the
/// service's batch limits. The writer owns the running transferred count
/// for the duration of a run.
pub struct BatchWriter<'a> {
    client: &'a dyn IndexClient,
    index: &'a str,
    written: u64,
}

impl<'a> BatchWriter<'a> {
    /// Creates a writer bound to a destination index.
    pub fn new(client: &'a dyn IndexClient, index: &'a str) -> Self {
        Self {
            client,
            index,
            written: 0,
        }
    }

    /// Persists one page of records, awaiting durability, and returns the
    /// new running total.
    ///
    /// On failure the error propagates and the count stays at the pages
    /// already committed; partial writes inside a failed batch are whatever
    /// the service itself guarantees.
    pub async fn write_page(&mut self, records: &[Record]) -> Result<u64> {
        let wrap = |e: Error| Error::Write(e.to_string());

        let task = self
            .client
            .save_records(self.index, records)
            .await
            .map_err(wrap)?;
        self.client.wait_task(self.index, task).await.map_err(wrap)?;

        self.written += records.len() as u64;
        debug!(
            "{}: wrote page of {} records (total: {})",
            self.index,
            records.len(),
            self.written
        );
        Ok(self.written)
    }

    /// Running total of records written so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }
}
