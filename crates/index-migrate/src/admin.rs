//! Deployment administration: pattern-based index deletion.

use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::IndexClient;
use crate::error::Result;

/// Outcome of a [`delete_indexes_matching`] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Indexes whose replica lists were rewritten.
    pub detached_replicas: u64,
    /// Indexes deleted (or that would be deleted in a dry run).
    pub deleted: u64,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Deletes every index whose name matches `pattern`.
///
/// Replicas of surviving indexes that match the pattern are detached first
/// by rewriting the owning index's settings, otherwise the service refuses
/// the deletion. With `apply == false` (the default posture) nothing is
/// modified and the summary reports what would happen.
pub async fn delete_indexes_matching(
    client: &dyn IndexClient,
    pattern: &Regex,
    apply: bool,
) -> Result<DeleteSummary> {
    let indexes = client.list_indexes().await?;
    let mut summary = DeleteSummary {
        dry_run: !apply,
        ..Default::default()
    };

    // Pass 1: detach matching replicas from surviving indexes.
    for index in &indexes {
        let settings = client.fetch_settings(&index.name).await?;
        // Older deployments report replicas under the legacy "slaves" key.
        let key = if settings.get("slaves").is_some() {
            "slaves"
        } else {
            "replicas"
        };
        let Some(replicas) = settings.get(key).and_then(Value::as_array) else {
            continue;
        };

        let kept: Vec<Value> = replicas
            .iter()
            .filter(|r| r.as_str().is_none_or(|name| !pattern.is_match(name)))
            .cloned()
            .collect();

        if kept.len() == replicas.len() {
            continue;
        }

        summary.detached_replicas += 1;
        if apply {
            info!("{}: detaching replicas matching pattern", index.name);
            let patch = serde_json::json!({ key: kept });
            let task = client.put_settings(&index.name, &patch).await?;
            client.wait_task(&index.name, task).await?;
        } else {
            warn!(
                "[dry run] {}: would rewrite {} -> {} replicas",
                index.name,
                replicas.len(),
                kept.len()
            );
        }
    }

    // Pass 2: delete matching indexes.
    for index in indexes.iter().filter(|i| pattern.is_match(&i.name)) {
        summary.deleted += 1;
        if apply {
            info!("Deleting index: {}", index.name);
            let task = client.delete_index(&index.name).await?;
            client.wait_task(&index.name, task).await?;
        } else {
            warn!("[dry run] Would delete index: {}", index.name);
        }
    }

    info!(
        "{}{} indexes deleted, {} replica lists rewritten",
        if apply { "" } else { "[dry run] " },
        summary.deleted,
        summary.detached_replicas
    );

    Ok(summary)
}
