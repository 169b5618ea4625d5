//! index-migrate CLI
//!
//! Migrate contents and configuration between hosted search indices.

// CLI tool - relax pedantic lints for ergonomics
#![allow(clippy::pedantic)]

use clap::{Args, Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use index_migrate::{
    delete_indexes_matching, transfer_config, ConsoleProgress, ExportOptions, FieldMapper,
    IndexClient, IndexRef, RestClient, TransferOptions, TransferPipeline,
};

#[derive(Parser)]
#[command(name = "index-migrate")]
#[command(version)]
#[command(about = "Migrate contents and configuration between hosted search indices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Source deployment arguments.
#[derive(Args)]
struct SourceArgs {
    /// Source service endpoint URL
    #[arg(long, env = "SOURCE_ENDPOINT")]
    source_endpoint: String,

    /// Source API key
    #[arg(long, env = "SOURCE_API_KEY")]
    source_key: String,

    /// Source index name
    #[arg(long)]
    source_index: String,
}

/// Destination deployment arguments.
#[derive(Args)]
struct DestArgs {
    /// Destination service endpoint URL
    #[arg(long, env = "DEST_ENDPOINT")]
    dest_endpoint: String,

    /// Destination API key
    #[arg(long, env = "DEST_API_KEY")]
    dest_key: String,

    /// Destination index name [default: the source index name]
    #[arg(long)]
    dest_index: Option<String>,
}

/// Single-deployment arguments.
#[derive(Args)]
struct ServiceArgs {
    /// Service endpoint URL
    #[arg(long, env = "SERVICE_ENDPOINT")]
    endpoint: String,

    /// API key
    #[arg(long, env = "SERVICE_API_KEY")]
    key: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy configuration, then stream all records, source to destination
    Transfer {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        dest: DestArgs,

        /// Transfer options file (YAML: attributes, page_size, rename_fields)
        #[arg(short, long, value_name = "FILE")]
        options: Option<PathBuf>,
    },

    /// Copy settings, synonyms, and rules only
    TransferConfig {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        dest: DestArgs,
    },

    /// Print an index's settings as JSON
    GetSettings {
        #[command(flatten)]
        service: ServiceArgs,

        /// Index name
        #[arg(long)]
        index: String,
    },

    /// Replace an index's settings from a JSON file
    SetSettings {
        #[command(flatten)]
        service: ServiceArgs,

        /// Index name
        #[arg(long)]
        index: String,

        /// Settings file (JSON)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete all indexes matching a pattern (dry run unless --apply)
    DeleteIndexes {
        #[command(flatten)]
        service: ServiceArgs,

        /// Regular expression matched against index names
        #[arg(short, long)]
        pattern: String,

        /// Actually delete; without this flag the command only reports
        #[arg(long)]
        apply: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Transfer {
            source,
            dest,
            options,
        } => {
            run_transfer(source, dest, options).await?;
        }
        Commands::TransferConfig { source, dest } => {
            run_transfer_config(source, dest).await?;
        }
        Commands::GetSettings { service, index } => {
            let client = RestClient::new(service.endpoint, service.key)?;
            let settings = client.fetch_settings(&index).await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::SetSettings {
            service,
            index,
            file,
        } => {
            let settings: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let client = RestClient::new(service.endpoint, service.key)?;
            let task = client.put_settings(&index, &settings).await?;
            client.wait_task(&index, task).await?;
            println!("Settings applied to index '{}'.", index);
        }
        Commands::DeleteIndexes {
            service,
            pattern,
            apply,
        } => {
            let pattern = Regex::new(&pattern)?;
            let client = RestClient::new(service.endpoint, service.key)?;
            let summary = delete_indexes_matching(&client, &pattern, apply).await?;
            if summary.dry_run {
                println!(
                    "[dry run] {} indexes would be deleted, {} replica lists rewritten. Re-run with --apply.",
                    summary.deleted, summary.detached_replicas
                );
            } else {
                println!("{} indexes deleted.", summary.deleted);
            }
        }
    }

    Ok(())
}

async fn run_transfer(
    source: SourceArgs,
    dest: DestArgs,
    options_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let options = match options_path {
        Some(path) => {
            info!("Loading transfer options from {:?}", path);
            TransferOptions::from_file(&path)?
        }
        None => TransferOptions::default(),
    };

    let (source, dest) = resolve_refs(source, dest);

    let mut pipeline = TransferPipeline::between(&source, &dest)?
        .with_progress(Box::new(ConsoleProgress::new()))
        .with_options(ExportOptions {
            attributes: options.attributes.clone(),
            page_size: options.page_size,
        });

    if !options.rename_fields.is_empty() {
        pipeline = pipeline.with_transform(Box::new(FieldMapper::new(options.rename_fields)?));
    }

    let report = pipeline.run().await?;

    println!(
        "Transferred {} records in {} pages ({:.2}s, {:.0} rec/sec)",
        report.records_transferred,
        report.pages,
        report.duration_secs,
        report.throughput()
    );

    Ok(())
}

async fn run_transfer_config(source: SourceArgs, dest: DestArgs) -> anyhow::Result<()> {
    let (source, dest) = resolve_refs(source, dest);

    let source_client = RestClient::new(&source.endpoint, &source.api_key)?;
    let dest_client = RestClient::new(&dest.endpoint, &dest.api_key)?;

    transfer_config(&source_client, &source.index, &dest_client, &dest.index).await?;

    println!(
        "Configuration transferred: {} -> {}.",
        source.index, dest.index
    );

    Ok(())
}

/// Builds index references from CLI arguments. The destination index name
/// defaults to the source index name when unspecified.
fn resolve_refs(source: SourceArgs, dest: DestArgs) -> (IndexRef, IndexRef) {
    let dest_index = dest
        .dest_index
        .unwrap_or_else(|| source.source_index.clone());
    (
        IndexRef {
            endpoint: source.source_endpoint,
            api_key: source.source_key,
            index: source.source_index,
        },
        IndexRef {
            endpoint: dest.dest_endpoint,
            api_key: dest.dest_key,
            index: dest_index,
        },
    )
}
