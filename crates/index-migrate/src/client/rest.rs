//! REST client for the hosted search service API.
//!
//! All write operations are asynchronous on the service side: they return a
//! task id, and the write is only durable once the task reaches the
//! `published` state. Callers that need durability poll via
//! [`IndexClient::wait_task`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::client::common::{create_http_client, handle_http_error, validate_endpoint};
use crate::client::{ExportPage, IndexClient, IndexSummary, Record, TaskRef};
use crate::error::{Error, Result};

/// Interval between task status polls.
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum number of task status polls before giving up (~60s).
const TASK_POLL_ATTEMPTS: u32 = 600;

/// Browse request body.
#[derive(Debug, Serialize)]
struct BrowseRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    #[serde(
        rename = "attributesToRetrieve",
        skip_serializing_if = "Option::is_none"
    )]
    attributes_to_retrieve: Option<&'a [String]>,
    #[serde(rename = "hitsPerPage", skip_serializing_if = "Option::is_none")]
    hits_per_page: Option<usize>,
}

/// Browse response: one page of hits plus the cursor for the next page.
/// The final page carries no cursor.
#[derive(Debug, Deserialize)]
struct BrowseResponse {
    hits: Vec<Record>,
    #[serde(default)]
    cursor: Option<String>,
}

/// Batched record write request.
#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Debug, Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a Record,
}

/// Acknowledgement carrying the task id of an asynchronous write.
#[derive(Debug, Deserialize)]
struct TaskAck {
    #[serde(rename = "taskID")]
    task_id: u64,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ListIndexesResponse {
    items: Vec<IndexSummary>,
}

/// REST implementation of [`IndexClient`].
pub struct RestClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl RestClient {
    /// Creates a client for one service deployment.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint)?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: create_http_client(),
        })
    }

    /// Builds a URL under the per-index API root.
    fn index_url(&self, index: &str, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/1/indexes/{}", self.endpoint, index)
        } else {
            format!("{}/1/indexes/{}/{}", self.endpoint, index, suffix)
        }
    }

    /// Attaches the authentication header.
    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    /// Sends a request and deserializes a JSON response, mapping non-success
    /// statuses to errors.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = self.authed(req).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(handle_http_error(status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IndexClient for RestClient {
    async fn fetch_settings(&self, index: &str) -> Result<Value> {
        let url = self.index_url(index, "settings");
        self.execute(self.client.get(&url)).await
    }

    async fn export_synonyms(&self, index: &str) -> Result<Vec<Value>> {
        let url = self.index_url(index, "synonyms");
        self.execute(self.client.get(&url)).await
    }

    async fn export_rules(&self, index: &str) -> Result<Vec<Value>> {
        let url = self.index_url(index, "rules");
        self.execute(self.client.get(&url)).await
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<TaskRef> {
        let url = self.index_url(index, "settings");
        let ack: TaskAck = self.execute(self.client.put(&url).json(settings)).await?;
        Ok(TaskRef {
            task_id: ack.task_id,
        })
    }

    async fn put_synonyms(&self, index: &str, synonyms: &[Value]) -> Result<TaskRef> {
        let url = self.index_url(index, "synonyms/batch");
        let ack: TaskAck = self.execute(self.client.post(&url).json(&synonyms)).await?;
        Ok(TaskRef {
            task_id: ack.task_id,
        })
    }

    async fn put_rules(&self, index: &str, rules: &[Value]) -> Result<TaskRef> {
        let url = self.index_url(index, "rules/batch");
        let ack: TaskAck = self.execute(self.client.post(&url).json(&rules)).await?;
        Ok(TaskRef {
            task_id: ack.task_id,
        })
    }

    async fn browse_page(
        &self,
        index: &str,
        cursor: Option<&str>,
        attributes: &[String],
        page_size: Option<usize>,
    ) -> Result<ExportPage> {
        let url = self.index_url(index, "browse");
        let body = BrowseRequest {
            cursor,
            attributes_to_retrieve: if attributes.is_empty() {
                None
            } else {
                Some(attributes)
            },
            hits_per_page: page_size,
        };
        let response: BrowseResponse = self.execute(self.client.post(&url).json(&body)).await?;
        Ok(ExportPage {
            records: response.hits,
            cursor: response.cursor,
        })
    }

    async fn save_records(&self, index: &str, records: &[Record]) -> Result<TaskRef> {
        let url = self.index_url(index, "batch");
        let body = BatchRequest {
            requests: records
                .iter()
                .map(|r| BatchOperation {
                    action: "addObject",
                    body: r,
                })
                .collect(),
        };
        let ack: TaskAck = self.execute(self.client.post(&url).json(&body)).await?;
        Ok(TaskRef {
            task_id: ack.task_id,
        })
    }

    async fn wait_task(&self, index: &str, task: TaskRef) -> Result<()> {
        let url = self.index_url(index, &format!("task/{}", task.task_id));
        for _ in 0..TASK_POLL_ATTEMPTS {
            let status: TaskStatus = self.execute(self.client.get(&url)).await?;
            if status.status == "published" {
                return Ok(());
            }
            tokio::time::sleep(TASK_POLL_INTERVAL).await;
        }
        Err(Error::Task(
            task.task_id,
            "timed out waiting for publication".to_string(),
        ))
    }

    async fn list_indexes(&self) -> Result<Vec<IndexSummary>> {
        let url = format!("{}/1/indexes", self.endpoint);
        let response: ListIndexesResponse = self.execute(self.client.get(&url)).await?;
        Ok(response.items)
    }

    async fn delete_index(&self, index: &str) -> Result<TaskRef> {
        let url = self.index_url(index, "");
        let ack: TaskAck = self.execute(self.client.delete(&url)).await?;
        Ok(TaskRef {
            task_id: ack.task_id,
        })
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
