//! Streaming export cursor over a paginated index browse.
//!
//! The cursor is pull-based: callers ask for the next page and nothing is
//! fetched until they do, so at most one page is ever held in memory. A
//! cursor is not restartable; open a fresh one per run.

use tracing::debug;

use crate::client::{ExportPage, IndexClient};
use crate::error::{Error, Result};

/// Options for opening an export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Record fields to retrieve (empty = all attributes).
    pub attributes: Vec<String>,
    /// Page size hint passed to the service.
    pub page_size: Option<usize>,
}

/// Pull-based cursor over the pages of an index export.
pub struct ExportCursor<'a> {
    client: &'a dyn IndexClient,
    index: &'a str,
    options: ExportOptions,
    cursor: Option<String>,
    done: bool,
}

impl<'a> ExportCursor<'a> {
    /// Opens an export over `index`. No request is issued until the first
    /// call to [`next_page`](Self::next_page).
    pub fn open(client: &'a dyn IndexClient, index: &'a str, options: ExportOptions) -> Self {
        Self {
            client,
            index,
            options,
            cursor: None,
            done: false,
        }
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(None)` once the source is exhausted. Any transport or
    /// API failure is terminal: it is returned once as an [`Error::Export`]
    /// and the cursor reports exhaustion afterwards.
    pub async fn next_page(&mut self) -> Result<Option<ExportPage>> {
        if self.done {
            return Ok(None);
        }

        let result = self
            .client
            .browse_page(
                self.index,
                self.cursor.as_deref(),
                &self.options.attributes,
                self.options.page_size,
            )
            .await;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(Error::Export(e.to_string()));
            }
        };

        debug!(
            "{}: browsed page of {} records (final: {})",
            self.index,
            page.records.len(),
            page.is_final()
        );

        if page.is_final() {
            self.done = true;
        } else {
            self.cursor = page.cursor.clone();
        }

        Ok(Some(page))
    }
}
