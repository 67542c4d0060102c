///
/// This module implements the CLI interface for doc-ingest: command parsing,
/// argument validation and the async entrypoint used by `main` and by tests.
///
/// All pipeline logic (discovery, validation, PDF extraction, metadata and the
/// batch loop) lives in the [`doc-ingest-core`] crate. This module only wires
/// configuration, the HTTP client and user-visible output together.
///
/// ## How To Use
/// - For command-line users: run the `doc-ingest` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`doc-ingest-core`]: ../../doc-ingest-core/
use crate::load_config::load_config;
use crate::upload::DocumentApiClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_ingest_core::batch::BatchOrchestrator;
use doc_ingest_core::contract::Uploader;
use doc_ingest_core::manage::{delete_all_documents, describe_document};
use doc_ingest_core::metadata::Metadata;
use std::path::PathBuf;
use tokio::sync::watch;

/// CLI for doc-ingest: bulk-upload a document directory to the document API.
#[derive(Parser)]
#[clap(
    name = "doc-ingest",
    version,
    about = "Validate, convert and upload a directory of documents to a CodeGPT document library"
)]
pub struct Cli {
    /// Optional YAML config file (API endpoint, throttle, default directory)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process and upload every supported file under a directory
    Upload {
        /// Directory to ingest; defaults to the configured or DOCUMENT_DIRECTORY directory
        #[clap(long)]
        dir: Option<PathBuf>,
    },
    /// Process and upload a single file
    UploadFile {
        /// File to upload; PDFs are converted to text first
        path: PathBuf,
    },
    /// List all documents in the library
    List,
    /// Delete a single document by id
    Delete {
        /// Document id
        id: String,
    },
    /// Delete every document in the library
    DeleteAll {
        /// Confirm deletion of all documents
        #[clap(long)]
        yes: bool,
    },
    /// Replace the metadata of an existing document
    UpdateMetadata {
        /// Document id
        id: String,
        #[clap(long, default_value = "")]
        title: String,
        #[clap(long, default_value = "")]
        description: String,
        #[clap(long, default_value = "")]
        summary: String,
        /// Comma separated keywords
        #[clap(long, default_value = "")]
        keywords: String,
        /// Language code, e.g. `en`
        #[clap(long, default_value = "")]
        language: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref()).context("Configuration error")?;
    let client = DocumentApiClient::new(&config.api).context("Failed to construct API client")?;

    match cli.command {
        Commands::Upload { dir } => {
            let directory = dir.or(config.directory.clone()).context(
                "No document directory: pass --dir or set DOCUMENT_DIRECTORY",
            )?;
            tracing::info!(command = "upload", directory = %directory.display(), "Starting batch upload");

            let (stop_tx, stop_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, finishing current file");
                    let _ = stop_tx.send(true);
                }
            });

            let orchestrator =
                BatchOrchestrator::new(&config.ingest, &client).with_shutdown(stop_rx);
            let report = orchestrator.run(&directory).await;
            println!("{report}");
            Ok(())
        }
        Commands::UploadFile { path } => {
            tracing::info!(command = "upload-file", path = %path.display(), "Starting single upload");
            let orchestrator = BatchOrchestrator::new(&config.ingest, &client);
            let outcome = orchestrator.upload_one(&path).await;
            if !outcome.succeeded {
                anyhow::bail!(
                    "Failed to upload {}: {}",
                    outcome.path.display(),
                    outcome.reason.unwrap_or_default()
                );
            }
            println!("Successfully uploaded: {}", outcome.path.display());
            Ok(())
        }
        Commands::List => {
            let documents = client
                .list_documents()
                .await
                .context("Failed to fetch documents")?;
            println!("=== Document Library ===");
            if documents.is_empty() {
                println!("No documents found");
            }
            for document in &documents {
                println!("{}", describe_document(document));
            }
            Ok(())
        }
        Commands::Delete { id } => {
            client
                .delete_document(&id)
                .await
                .with_context(|| format!("Failed to delete document {id}"))?;
            println!("Document {id} deleted successfully");
            Ok(())
        }
        Commands::DeleteAll { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete ALL documents without --yes");
            }
            let report = delete_all_documents(&client)
                .await
                .context("Failed to list documents for deletion")?;
            for id in &report.deleted {
                println!("Deleted document: {id}");
            }
            for (id, e) in &report.failed {
                eprintln!("[ERROR] Failed to delete {id}: {e}");
            }
            if !report.failed.is_empty() {
                anyhow::bail!("{} document(s) could not be deleted", report.failed.len());
            }
            Ok(())
        }
        Commands::UpdateMetadata {
            id,
            title,
            description,
            summary,
            keywords,
            language,
        } => {
            let metadata = Metadata {
                title,
                description,
                summary,
                keywords,
                language,
            };
            client
                .update_metadata(&id, &metadata)
                .await
                .with_context(|| format!("Failed to update metadata for {id}"))?;
            println!("Metadata updated successfully");
            Ok(())
        }
    }
}
