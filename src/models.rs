//! Core data models used throughout docrag.
//!
//! These types represent the documents, page units, and retrieval results
//! that flow through the ingestion and query pipelines.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// An uploaded multi-page document, as received at the upload boundary.
///
/// Consumed entirely by the ingestion coordinator; the on-disk copy is
/// deleted after processing whether or not processing succeeded.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

/// One page split out of a [`SourceDocument`].
///
/// The output filename is a pure function of (prefix, parent base name,
/// 1-based page index), so re-splitting the same source overwrites rather
/// than duplicates. Page units persist in the staging directory after
/// indexing for audit and recovery.
#[derive(Debug, Clone)]
pub struct PageUnit {
    pub parent: String,
    pub page: u32,
    pub path: PathBuf,
}

impl PageUnit {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A ranked passage returned by the retriever.
#[derive(Debug, Clone)]
pub struct Passage {
    pub body: String,
    pub score: f64,
    pub highlights: Vec<String>,
}

/// Free-text answer produced by the generator for one query.
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub text: String,
}
