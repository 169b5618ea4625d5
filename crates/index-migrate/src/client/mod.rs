//! Client abstraction for the hosted search service.

pub mod common;
pub mod rest;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use rest::RestClient;

/// A single index record: an opaque JSON object carrying a unique
/// `objectID` field.
pub type Record = serde_json::Map<String, Value>;

/// Name of the unique identifier field every record carries.
pub const OBJECT_ID: &str = "objectID";

/// One page of records from a cursor-based export.
#[derive(Debug, Clone)]
pub struct ExportPage {
    /// Records in this page, in source order.
    pub records: Vec<Record>,
    /// Cursor for the next page; `None` marks exhaustion.
    pub cursor: Option<String>,
}

impl ExportPage {
    /// Whether this is the last page of the export.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Handle for an asynchronous write task.
///
/// Every write call returns one; the write is durable only once the
/// service reports the task as published (see [`IndexClient::wait_task`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef {
    /// Service-assigned task identifier.
    pub task_id: u64,
}

/// Summary entry from an index listing.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IndexSummary {
    /// Index name.
    pub name: String,
    /// Number of records, if the service reports it.
    #[serde(default)]
    pub entries: Option<u64>,
}

/// Trait for clients of a hosted search service deployment.
///
/// One client is bound to one deployment (endpoint + API key); operations
/// take the index name. Implement this trait to target a different service
/// or to stub the service out in tests.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Fetch the settings object of an index.
    async fn fetch_settings(&self, index: &str) -> Result<Value>;

    /// Export all synonym rules of an index.
    async fn export_synonyms(&self, index: &str) -> Result<Vec<Value>>;

    /// Export all query/ranking rules of an index.
    async fn export_rules(&self, index: &str) -> Result<Vec<Value>>;

    /// Replace the settings of an index.
    async fn put_settings(&self, index: &str, settings: &Value) -> Result<TaskRef>;

    /// Replace the synonym rules of an index.
    async fn put_synonyms(&self, index: &str, synonyms: &[Value]) -> Result<TaskRef>;

    /// Replace the query/ranking rules of an index.
    async fn put_rules(&self, index: &str, rules: &[Value]) -> Result<TaskRef>;

    /// Fetch one page of a cursor-based export.
    ///
    /// Pass `None` to open the export, then the cursor from the previous
    /// page. `attributes` selects which record fields the service returns
    /// (empty = all).
    async fn browse_page(
        &self,
        index: &str,
        cursor: Option<&str>,
        attributes: &[String],
        page_size: Option<usize>,
    ) -> Result<ExportPage>;

    /// Write a batch of records to an index.
    async fn save_records(&self, index: &str, records: &[Record]) -> Result<TaskRef>;

    /// Block until the given task is published.
    async fn wait_task(&self, index: &str, task: TaskRef) -> Result<()>;

    /// List all indexes of the deployment.
    async fn list_indexes(&self) -> Result<Vec<IndexSummary>>;

    /// Delete an index.
    async fn delete_index(&self, index: &str) -> Result<TaskRef>;
}
