//! Plain-text extraction from single-page PDF units.
//!
//! Extraction never panics past this boundary: every engine failure comes
//! back as a typed [`ExtractError`] so the ingestion pass can skip the unit
//! and continue. Empty or whitespace-only output is failure-equivalent —
//! indexing empty bodies would pollute the index with unmatchable records.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document contains no extractable text")]
    EmptyContent,
    #[error("PDF extraction failed: {0}")]
    ExtractionFailure(String),
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Extracts the plain text of one page unit.
///
/// Blocking: callers on the async path should run this under
/// `spawn_blocking`.
pub fn extract_page_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    debug!("Extracting text from {}", path.display());
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| ExtractError::ExtractionFailure(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    Ok(text)
}
