//! Configuration types for index transfers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Reference to one index of a hosted search deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRef {
    /// Service endpoint URL (e.g. <https://search.example.com>).
    pub endpoint: String,
    /// API key for the deployment.
    pub api_key: String,
    /// Index name.
    pub index: String,
}

/// Options for the `transfer` command, loadable from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferOptions {
    /// Record fields to export (empty = all attributes).
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Page size hint for the export.
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Field renames applied to every record (`source field -> new name`).
    #[serde(default)]
    pub rename_fields: HashMap<String, String>,
}

impl TransferOptions {
    /// Load options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = serde_yaml::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if let Some(0) = self.page_size {
            return Err(Error::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
