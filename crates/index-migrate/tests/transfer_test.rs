//! End-to-end transfer tests against mock service deployments.

#![allow(clippy::pedantic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use index_migrate::{
    Error, ExportOptions, FieldMapper, ProgressSink, RestClient, TransferPipeline,
};

/// Progress sink recording every reported count.
#[derive(Default)]
struct RecordingSink {
    pages: Mutex<Vec<u64>>,
    completed: Mutex<Option<u64>>,
}

impl ProgressSink for RecordingSink {
    fn on_page(&self, transferred: u64) {
        self.pages.lock().unwrap().push(transferred);
    }
    fn on_complete(&self, transferred: u64) {
        *self.completed.lock().unwrap() = Some(transferred);
    }
}

/// Mounts the source-side configuration reads.
async fn mount_source_config(server: &MockServer, index: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/1/indexes/{index}/settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchableAttributes": ["title"],
            "customRanking": ["desc(popularity)"]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/1/indexes/{index}/synonyms")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"objectID": "syn-1", "type": "synonym", "synonyms": ["tv", "television"]}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/1/indexes/{index}/rules")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Mounts the destination-side configuration writes and task polling.
async fn mount_dest_config(server: &MockServer, index: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/1/indexes/{index}/settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 11})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/1/indexes/{index}/synonyms/batch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 12})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/1/indexes/{index}/rules/batch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 13})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(format!("^/1/indexes/{index}/task/\\d+$")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "published"})))
        .mount(server)
        .await;
}

fn hit(id: &str, title: &str) -> serde_json::Value {
    json!({"objectID": id, "title": title})
}

/// Collects the record batches a server received on its batch endpoint,
/// in arrival order.
async fn batches_received(server: &MockServer, index: &str) -> Vec<Vec<serde_json::Value>> {
    let batch_path = format!("/1/indexes/{index}/batch");
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == batch_path)
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["requests"]
                .as_array()
                .unwrap()
                .iter()
                .map(|op| op["body"].clone())
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn transfer_preserves_page_order_and_counts() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "products").await;
    mount_dest_config(&dest, "products").await;

    // Two pages of sizes [2, 3].
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [hit("1", "a"), hit("2", "b")],
            "cursor": "c1"
        })))
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .and(body_json(json!({"cursor": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [hit("3", "c"), hit("4", "d"), hit("5", "e")]
        })))
        .mount(&source)
        .await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/products/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 20})))
        .mount(&dest)
        .await;

    let progress = Arc::new(RecordingSink::default());
    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "products",
        "products",
    )
    .with_progress(Box::new(SharedSink(progress.clone())));

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.records_transferred, 5);
    assert_eq!(report.pages, 2);

    // Destination received both pages in source order.
    let batches = batches_received(&dest, "products").await;
    assert_eq!(batches.len(), 2);
    let ids: Vec<_> = batches
        .iter()
        .flatten()
        .map(|r| r["objectID"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

    // Progress counter observed as 2 then 5.
    assert_eq!(*progress.pages.lock().unwrap(), vec![2, 5]);
    assert_eq!(*progress.completed.lock().unwrap(), Some(5));
}

/// Forwards to a shared recording sink.
struct SharedSink(Arc<RecordingSink>);

impl ProgressSink for SharedSink {
    fn on_page(&self, transferred: u64) {
        self.0.on_page(transferred);
    }
    fn on_complete(&self, transferred: u64) {
        self.0.on_complete(transferred);
    }
}

#[tokio::test]
async fn config_failure_prevents_any_export() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "products").await;

    // Settings write succeeds, synonyms write fails.
    Mock::given(method("PUT"))
        .and(path("/1/indexes/products/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 11})))
        .mount(&dest)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/1/indexes/products/task/\\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "published"})))
        .mount(&dest)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/synonyms/batch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("synonyms rejected"))
        .mount(&dest)
        .await;

    // The export endpoint must never be hit.
    Mock::given(method("POST"))
        .and(path("/1/indexes/products/browse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": []})))
        .expect(0)
        .mount(&source)
        .await;

    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "products",
        "products",
    );

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::ConfigTransfer(_)));
}

#[tokio::test]
async fn identity_transfer_copies_records_verbatim() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "docs").await;
    mount_dest_config(&dest, "docs").await;

    let original = json!({
        "objectID": "doc-1",
        "title": "Widget",
        "nested": {"price": 9.99, "tags": ["a", "b"]}
    });

    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"hits": [original.clone()]})),
        )
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 20})))
        .mount(&dest)
        .await;

    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "docs",
        "docs",
    );
    pipeline.run().await.unwrap();

    let batches = batches_received(&dest, "docs").await;
    assert_eq!(batches, vec![vec![original]]);
}

#[tokio::test]
async fn rename_transform_keeps_identifiers() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "docs").await;
    mount_dest_config(&dest, "docs").await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [hit("1", "first"), hit("2", "second")]
        })))
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 20})))
        .mount(&dest)
        .await;

    let mapper =
        FieldMapper::new(HashMap::from([("title".to_string(), "name".to_string())])).unwrap();

    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "docs",
        "docs",
    )
    .with_transform(Box::new(mapper));
    pipeline.run().await.unwrap();

    let batches = batches_received(&dest, "docs").await;
    let records = &batches[0];
    assert_eq!(records[0]["name"], "first");
    assert!(records[0].get("title").is_none());
    assert_eq!(records[0]["objectID"], "1");
    assert_eq!(records[1]["objectID"], "2");
}

#[tokio::test]
async fn export_error_mid_stream_is_fatal_after_committed_pages() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "docs").await;
    mount_dest_config(&dest, "docs").await;

    // First page of 4 succeeds, second browse call blows up.
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [hit("1", "a"), hit("2", "b"), hit("3", "c"), hit("4", "d")],
            "cursor": "c1"
        })))
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .and(body_json(json!({"cursor": "c1"})))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream gone"))
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 20})))
        .mount(&dest)
        .await;

    let progress = Arc::new(RecordingSink::default());
    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "docs",
        "docs",
    )
    .with_progress(Box::new(SharedSink(progress.clone())));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::Export(_)));

    // Exactly the first page was committed.
    assert_eq!(*progress.pages.lock().unwrap(), vec![4]);
    assert!(progress.completed.lock().unwrap().is_none());
    assert_eq!(batches_received(&dest, "docs").await[0].len(), 4);
}

#[tokio::test]
async fn write_failure_is_fatal_and_count_reflects_committed_pages() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "docs").await;
    mount_dest_config(&dest, "docs").await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [hit("1", "a"), hit("2", "b")],
            "cursor": "c1"
        })))
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .and(body_json(json!({"cursor": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [hit("3", "c")]
        })))
        .mount(&source)
        .await;

    // First batch write succeeds, the second is rejected.
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 20})))
        .up_to_n_times(1)
        .mount(&dest)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/batch"))
        .respond_with(ResponseTemplate::new(503).set_body_string("index write refused"))
        .mount(&dest)
        .await;

    let progress = Arc::new(RecordingSink::default());
    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "docs",
        "docs",
    )
    .with_progress(Box::new(SharedSink(progress.clone())));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::Write(_)));

    // Count reflects exactly the first page.
    assert_eq!(*progress.pages.lock().unwrap(), vec![2]);
    assert!(progress.completed.lock().unwrap().is_none());
}

#[tokio::test]
async fn export_page_size_hint_is_forwarded() {
    let source = MockServer::start().await;
    let dest = MockServer::start().await;

    mount_source_config(&source, "docs").await;
    mount_dest_config(&dest, "docs").await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/browse"))
        .and(body_json(json!({"hitsPerPage": 2, "attributesToRetrieve": ["title"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": [hit("1", "a")]})))
        .expect(1)
        .mount(&source)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/docs/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 20})))
        .mount(&dest)
        .await;

    let pipeline = TransferPipeline::new(
        Arc::new(RestClient::new(source.uri(), "sk").unwrap()),
        Arc::new(RestClient::new(dest.uri(), "dk").unwrap()),
        "docs",
        "docs",
    )
    .with_options(ExportOptions {
        attributes: vec!["title".to_string()],
        page_size: Some(2),
    });

    pipeline.run().await.unwrap();
}
