//! Query orchestration: retrieval → prompt assembly → generation.
//!
//! Runs sequentially within one request. There are no retries; a failure in
//! either backend call halts the pipeline and surfaces as a single error
//! that names the originating stage, so an operator can tell a retrieval
//! outage from an inference outage without backend internals leaking to the
//! caller.

use thiserror::Error;
use tracing::info;

use crate::backend::Backend;
use crate::infer::{self, InferenceError};
use crate::models::GeneratedAnswer;
use crate::prompt;
use crate::search::{self, RetrievalError};

/// Pipeline stage at which a query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Retrieving,
    Generating,
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryStage::Retrieving => write!(f, "retrieval"),
            QueryStage::Generating => write!(f, "generation"),
        }
    }
}

#[derive(Debug, Error)]
#[error("query failed during {stage}: {source}")]
pub struct QueryError {
    pub stage: QueryStage,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl From<RetrievalError> for QueryError {
    fn from(e: RetrievalError) -> Self {
        Self {
            stage: QueryStage::Retrieving,
            source: e.into(),
        }
    }
}

impl From<InferenceError> for QueryError {
    fn from(e: InferenceError) -> Self {
        Self {
            stage: QueryStage::Generating,
            source: e.into(),
        }
    }
}

/// Answers one validated query: retrieve passages, assemble the grounded
/// prompt, generate. Callers validate non-emptiness of `query_text` before
/// calling.
pub async fn answer(backend: &Backend, query_text: &str) -> Result<GeneratedAnswer, QueryError> {
    let passages = search::search(backend, query_text).await?;
    let prompt = prompt::build_prompt(query_text, &passages);
    info!(
        "Assembled prompt from {} passages ({} chars)",
        passages.len(),
        prompt.len()
    );
    let answer = infer::generate(backend, &prompt).await?;
    Ok(answer)
}
