//! Retriever: semantic search against the page index.
//!
//! Issues a semantic-query request with highlighting and a fixed result cap,
//! and maps the backend's hit list into ranked [`Passage`]s. Input
//! validation (non-empty query) belongs to the boundary layer, not here.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use crate::backend::Backend;
use crate::models::Passage;

/// Maximum passages returned for one query.
pub const MAX_RESULTS: usize = 10;
/// Maximum highlighted fragments carried per passage.
pub const MAX_HIGHLIGHT_FRAGMENTS: usize = 2;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("search backend rejected query with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("search backend transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Request body for the semantic-search wire contract.
fn search_body(query_text: &str) -> Value {
    json!({
        "retriever": {
            "standard": {
                "query": {
                    "semantic": {
                        "field": "body",
                        "query": query_text,
                    }
                }
            }
        },
        "highlight": {
            "fields": {
                "body": {
                    "type": "semantic",
                    "number_of_fragments": MAX_HIGHLIGHT_FRAGMENTS,
                    "order": "score",
                }
            }
        },
        "size": MAX_RESULTS,
    })
}

/// Runs a semantic search for `query_text` and returns passages ordered by
/// the backend's relevance score, capped at [`MAX_RESULTS`]. Not retried on
/// failure.
pub async fn search(backend: &Backend, query_text: &str) -> Result<Vec<Passage>, RetrievalError> {
    info!("Performing semantic search for query: {}", query_text);

    let path = format!("{}/_search", backend.index_name);
    let resp = backend
        .post_json(&path, &search_body(query_text))
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RetrievalError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let data: Value = resp.json().await?;
    let passages = parse_hits(&data);
    info!("Found {} search hits.", passages.len());
    Ok(passages)
}

/// Maps the backend hit list into passages, skipping hits without a body.
fn parse_hits(data: &Value) -> Vec<Passage> {
    let hits = data
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    hits.iter()
        .filter_map(|hit| {
            let body = hit
                .pointer("/_source/body")
                .and_then(Value::as_str)?
                .to_string();
            if body.is_empty() {
                return None;
            }
            let score = hit
                .get("_score")
                .and_then(Value::as_f64)
                .unwrap_or_default();
            let highlights = hit
                .pointer("/highlight/body")
                .and_then(Value::as_array)
                .map(|frags| {
                    frags
                        .iter()
                        .filter_map(Value::as_str)
                        .take(MAX_HIGHLIGHT_FRAGMENTS)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(Passage {
                body,
                score,
                highlights,
            })
        })
        .take(MAX_RESULTS)
        .collect()
}
