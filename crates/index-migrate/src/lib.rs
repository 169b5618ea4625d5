// Migration tool - pedantic lints relaxed for CLI ergonomics
#![allow(clippy::pedantic)]

//! # `index-migrate`
//!
//! `index-migrate` is a CLI tool and library for migrating hosted search
//! indices (contents and configuration) between deployments.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `transfer` | Copy configuration, then stream all records, source to destination |
//! | `transfer-config` | Copy settings, synonyms, and rules only |
//! | `get-settings` | Print an index's settings |
//! | `set-settings` | Replace an index's settings from a JSON file |
//! | `delete-indexes` | Delete all indexes matching a pattern (dry run by default) |
//!
//! ## Quick Start
//!
//! ```bash
//! # Full transfer between deployments
//! index-migrate transfer \
//!     --source-endpoint https://search-a.example.com --source-key $SOURCE_KEY \
//!     --source-index products \
//!     --dest-endpoint https://search-b.example.com --dest-key $DEST_KEY
//!
//! # Preview which indexes a pattern would delete
//! index-migrate delete-indexes --endpoint https://search-a.example.com \
//!     --key $KEY --pattern '^staging_'
//! ```
//!
//! ## Library use
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use index_migrate::{RestClient, TransferPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = Arc::new(RestClient::new("https://search-a.example.com", "key-a")?);
//!     let destination = Arc::new(RestClient::new("https://search-b.example.com", "key-b")?);
//!
//!     let report = TransferPipeline::new(source, destination, "products", "products")
//!         .run()
//!         .await?;
//!     println!("Transferred {} records", report.records_transferred);
//!     Ok(())
//! }
//! ```
//!
//! The transfer is strictly sequential per page: configuration is applied
//! before the first export call, and the next page is only requested after
//! the previous page has been transformed and durably written.

#![warn(missing_docs)]

pub mod admin;
pub mod bundle;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod transform;
pub mod writer;

pub use admin::{delete_indexes_matching, DeleteSummary};
pub use bundle::{transfer_config, ConfigBundle};
pub use client::{ExportPage, IndexClient, Record, RestClient, TaskRef, OBJECT_ID};
pub use config::{IndexRef, TransferOptions};
pub use error::{Error, Result};
pub use export::{ExportCursor, ExportOptions};
pub use pipeline::{TransferPipeline, TransferReport};
pub use progress::{ConsoleProgress, NullProgress, ProgressSink};
pub use transform::{FieldMapper, Identity, RecordTransform};
pub use writer::BatchWriter;
