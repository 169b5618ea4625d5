//! Index configuration bundle: settings, synonym rules, and query rules.

use serde_json::Value;
use tracing::{debug, info};

use crate::client::IndexClient;
use crate::error::{Error, Result};

/// The full configuration of an index.
///
/// Captured once from a source index and written once to a destination
/// index. Applying a bundle overwrites the destination configuration
/// destructively; there is no merge, and no atomicity across the three
/// parts.
#[derive(Debug, Clone)]
pub struct ConfigBundle {
    /// Index settings object.
    pub settings: Value,
    /// Synonym rules, in export order.
    pub synonyms: Vec<Value>,
    /// Query/ranking rules, in export order.
    pub rules: Vec<Value>,
}

impl ConfigBundle {
    /// Captures the configuration of an index.
    ///
    /// The three reads are independent and issued concurrently.
    pub async fn fetch(client: &dyn IndexClient, index: &str) -> Result<Self> {
        let (settings, synonyms, rules) = futures::try_join!(
            client.fetch_settings(index),
            client.export_synonyms(index),
            client.export_rules(index),
        )
        .map_err(|e| Error::ConfigTransfer(e.to_string()))?;

        debug!(
            "{}: captured settings, {} synonyms, {} rules",
            index,
            synonyms.len(),
            rules.len()
        );

        Ok(Self {
            settings,
            synonyms,
            rules,
        })
    }

    /// Writes this bundle to an index, awaiting each write task.
    pub async fn apply(&self, client: &dyn IndexClient, index: &str) -> Result<()> {
        let wrap = |e: Error| Error::ConfigTransfer(e.to_string());

        let task = client.put_settings(index, &self.settings).await.map_err(wrap)?;
        client.wait_task(index, task).await.map_err(wrap)?;

        let task = client.put_synonyms(index, &self.synonyms).await.map_err(wrap)?;
        client.wait_task(index, task).await.map_err(wrap)?;

        let task = client.put_rules(index, &self.rules).await.map_err(wrap)?;
        client.wait_task(index, task).await.map_err(wrap)?;

        Ok(())
    }
}

/// Copies the configuration bundle of one index onto another.
///
/// Must complete before any data transfer begins: records indexed against
/// stale settings would be ranked and faceted wrong.
pub async fn transfer_config(
    source: &dyn IndexClient,
    source_index: &str,
    destination: &dyn IndexClient,
    destination_index: &str,
) -> Result<()> {
    info!(
        "Transferring configuration: {} -> {}",
        source_index, destination_index
    );
    let bundle = ConfigBundle::fetch(source, source_index).await?;
    bundle.apply(destination, destination_index).await?;
    info!("{}: configuration applied", destination_index);
    Ok(())
}
