//! Index writer: upserts extracted page text into the search index.
//!
//! The existence check before first use is best-effort, not transactional:
//! two first-writers may race on index creation, so a duplicate-create
//! rejection from the backend is treated as success.

use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::backend::Backend;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,
    #[error("body text must not be empty")]
    EmptyBody,
    #[error("search backend rejected {operation} with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("search backend transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Creates the index with default settings if it does not exist.
///
/// Idempotent and safe under concurrent creators: a `resource_already_exists`
/// style rejection means someone else won the race, which is fine.
pub async fn ensure_index(backend: &Backend) -> Result<(), IndexError> {
    let head = backend.head(&backend.index_name).send().await?;
    if head.status().is_success() {
        return Ok(());
    }

    info!("Index '{}' does not exist. Creating it.", backend.index_name);
    let resp = backend
        .put_json(&backend.index_name, &json!({}))
        .send()
        .await?;
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }

    let body = resp.text().await.unwrap_or_default();
    if body.contains("resource_already_exists_exception") {
        // Lost the creation race to a concurrent writer.
        return Ok(());
    }
    Err(IndexError::Rejected {
        operation: "index creation",
        status: status.as_u16(),
        body,
    })
}

/// Upserts one page record keyed by `id`. Replaces any existing record under
/// the same identifier. Returns the identifier on success.
pub async fn upsert(
    backend: &Backend,
    id: &str,
    file_name: &str,
    file_path: &str,
    body_text: &str,
) -> Result<String, IndexError> {
    if id.is_empty() {
        return Err(IndexError::EmptyIdentifier);
    }
    if body_text.trim().is_empty() {
        return Err(IndexError::EmptyBody);
    }

    let document = json!({
        "file_name": file_name,
        "file_path": file_path,
        "body": body_text,
    });

    let path = format!("{}/_doc/{}", backend.index_name, id);
    let resp = backend.put_json(&path, &document).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(IndexError::Rejected {
            operation: "upsert",
            status: status.as_u16(),
            body,
        });
    }

    info!("Successfully indexed '{}' with ID: {}", file_name, id);
    Ok(id.to_string())
}
