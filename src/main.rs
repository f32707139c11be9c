//! # docrag CLI
//!
//! The `docrag` binary serves the HTTP API and provides one-shot commands
//! for ingestion, querying, and staging-directory reconciliation.
//!
//! ## Usage
//!
//! ```bash
//! docrag serve
//! docrag ingest ./fridge-manual.pdf
//! docrag query "ice maker not working"
//! docrag reconcile
//! ```
//!
//! Configuration comes from the environment; `ELASTICSEARCH_URL`,
//! `INDEX_NAME`, and `API_KEY` are required for every command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docrag::{backend::Backend, config::Config, ingest, query, server};

/// docrag — a PDF ingestion and retrieval-augmented question answering
/// service.
#[derive(Parser)]
#[command(
    name = "docrag",
    about = "PDF ingestion and retrieval-augmented question answering",
    version,
    long_about = "docrag splits uploaded PDF manuals into per-page units, indexes their \
    extracted text into a semantic search index, and answers natural-language questions \
    by retrieving relevant passages and generating a grounded answer."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (upload + query endpoints).
    Serve,

    /// Ingest one PDF: split, extract, and index, then remove the input.
    ///
    /// Runs the same pipeline the upload endpoint triggers, synchronously.
    /// The input file is consumed (deleted) like an upload would be.
    Ingest {
        /// Path to a multi-page PDF.
        file: PathBuf,
    },

    /// Answer a question against the index and print the generated answer.
    Query {
        /// The question text.
        query: String,
    },

    /// Re-extract and re-index every page unit in the staging directory.
    ///
    /// Recovery sweep for pages whose indexing failed; upserts are
    /// idempotent, so this is safe to run at any time.
    Reconcile,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve => {
            server::run_server(config).await?;
        }
        Commands::Ingest { file } => {
            std::fs::create_dir_all(&config.staging_dir)?;
            let backend = Backend::new(&config)?;
            ingest::process_upload(&backend, &file, &config.staging_dir).await;
        }
        Commands::Query { query } => {
            if query.trim().is_empty() {
                anyhow::bail!("Query text is required.");
            }
            let backend = Backend::new(&config)?;
            let answer = query::answer(&backend, &query).await?;
            println!("{}", answer.text);
        }
        Commands::Reconcile => {
            let backend = Backend::new(&config)?;
            let indexed = ingest::reconcile(&backend, &config.staging_dir).await?;
            println!("reconcile");
            println!("  indexed: {} page units", indexed);
            println!("ok");
        }
    }

    Ok(())
}
