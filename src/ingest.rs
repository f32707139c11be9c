//! Ingestion pipeline orchestration.
//!
//! Coordinates the flow for one uploaded document: split into page units →
//! per-unit text extraction → index upsert. Failures are contained at page
//! granularity (one bad page never aborts the batch) and never reach the
//! uploader, who already got an acknowledgment; the log is the only durable
//! failure signal. The original upload is deleted whether or not processing
//! succeeded.
//!
//! Uploads are processed by a fixed pool of worker tasks fed from a bounded
//! queue; a full queue rejects the submission so burst uploads cannot spawn
//! unbounded work.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::backend::Backend;
use crate::extract::{self, ExtractError};
use crate::index;
use crate::split;

/// Prefix applied to every page unit produced from an upload.
pub const SPLIT_PREFIX: &str = "uploaded_";

#[derive(Debug, Error)]
#[error("ingestion queue is full")]
pub struct QueueFull;

/// Handle for submitting uploads to the ingestion worker pool.
#[derive(Clone)]
pub struct IngestPool {
    tx: mpsc::Sender<PathBuf>,
}

impl IngestPool {
    /// Spawns `workers` tasks draining a queue of `queue_depth` pending
    /// uploads. Workers run for the life of the process.
    pub fn spawn(
        backend: Arc<Backend>,
        staging_dir: PathBuf,
        workers: usize,
        queue_depth: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<PathBuf>(queue_depth);
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers {
            let rx = Arc::clone(&rx);
            let backend = Arc::clone(&backend);
            let staging_dir = staging_dir.clone();
            tokio::spawn(async move {
                loop {
                    let upload = { rx.lock().await.recv().await };
                    match upload {
                        Some(path) => {
                            info!("Worker {}: processing {}", worker, path.display());
                            process_upload(&backend, &path, &staging_dir).await;
                        }
                        None => break,
                    }
                }
            });
        }

        Self { tx }
    }

    /// Enqueues one upload without blocking. Fails with [`QueueFull`] when
    /// the pool is saturated; the boundary layer turns that into
    /// backpressure toward the client.
    pub fn try_submit(&self, upload: PathBuf) -> Result<(), QueueFull> {
        self.tx.try_send(upload).map_err(|_| QueueFull)
    }
}

/// Runs the full ingestion sequence for one uploaded document.
///
/// Fire-and-forget relative to the upload request: every error is caught
/// and logged here, and the uploaded file is removed unconditionally.
pub async fn process_upload(backend: &Backend, upload: &Path, staging_dir: &Path) {
    if let Err(e) = ingest_document(backend, upload, staging_dir).await {
        error!("Background task: error processing {}: {}", upload.display(), e);
    }

    match tokio::fs::remove_file(upload).await {
        Ok(()) => info!(
            "Background task: removed temporary uploaded file: {}",
            upload.display()
        ),
        Err(e) => warn!(
            "Background task: could not remove uploaded file {}: {}",
            upload.display(),
            e
        ),
    }
}

/// Split, then extract and index exactly the units the splitter produced.
async fn ingest_document(
    backend: &Backend,
    upload: &Path,
    staging_dir: &Path,
) -> anyhow::Result<()> {
    let upload_path = upload.to_path_buf();
    let staging = staging_dir.to_path_buf();
    let units = tokio::task::spawn_blocking(move || {
        split::split_document(&upload_path, &staging, SPLIT_PREFIX)
    })
    .await??;

    index::ensure_index(backend).await?;

    let mut indexed = 0usize;
    for unit in &units {
        if index_unit(backend, &unit.path).await {
            indexed += 1;
        }
    }
    info!(
        "Indexed {}/{} page units from {}",
        indexed,
        units.len(),
        upload.display()
    );
    Ok(())
}

/// Extracts and upserts one staged page file. Skips (with a warning) on
/// empty or unextractable content, and on an index rejection for this unit
/// alone.
async fn index_unit(backend: &Backend, unit_path: &Path) -> bool {
    let file_name = unit_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    // Record identifier is the filename without extension. Not globally
    // unique across uploads sharing a filename; upsert semantics make that
    // a latest-wins overwrite.
    let record_id = unit_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let path = unit_path.to_path_buf();
    let extracted = tokio::task::spawn_blocking(move || extract::extract_page_text(&path)).await;

    let text = match extracted {
        Ok(Ok(text)) => text,
        Ok(Err(ExtractError::EmptyContent)) => {
            warn!(
                "Skipping '{}' due to empty or unextractable content.",
                file_name
            );
            return false;
        }
        Ok(Err(e)) => {
            warn!("Skipping '{}': {}", file_name, e);
            return false;
        }
        Err(join_err) => {
            warn!("Skipping '{}': extraction task failed: {}", file_name, join_err);
            return false;
        }
    };

    let file_path = unit_path
        .canonicalize()
        .unwrap_or_else(|_| unit_path.to_path_buf());
    match index::upsert(
        backend,
        &record_id,
        &file_name,
        &file_path.to_string_lossy(),
        &text,
    )
    .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("Error indexing document '{}': {}", file_name, e);
            false
        }
    }
}

/// Recovery sweep: re-extracts and re-upserts every page unit currently in
/// the staging directory. Upserts are idempotent, so running this at any
/// time is safe; it exists for out-of-band reconciliation after partial
/// ingestion failures.
pub async fn reconcile(backend: &Backend, staging_dir: &Path) -> anyhow::Result<usize> {
    index::ensure_index(backend).await?;

    let mut entries = tokio::fs::read_dir(staging_dir).await?;
    let mut indexed = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !path.is_file() || !is_pdf {
            continue;
        }
        if index_unit(backend, &path).await {
            indexed += 1;
        }
    }
    Ok(indexed)
}
