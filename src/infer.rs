//! Generator client: sends the assembled prompt to the inference backend.
//!
//! The backend's completion endpoint answers in more than one shape
//! depending on the configured model service, so the response is decoded as
//! a tagged union of the known shapes with an explicit unrecognized
//! variant. An unrecognized body yields a fixed sentinel answer instead of
//! an error; only transport failures and non-2xx statuses are failures.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::models::GeneratedAnswer;

/// Returned when the response body matches none of the known shapes.
pub const UNPARSEABLE_RESPONSE: &str =
    "Could not parse the generated text from the model response.";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference backend rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("inference backend transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Known completion response shapes, tried in declaration order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Completion { completion: Vec<CompletionItem> },
    Choices { choices: Vec<ChoiceItem> },
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct CompletionItem {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ChoiceItem {
    text: String,
}

/// Sends `prompt` to the configured completion model and returns the
/// generated answer. Not retried on failure.
pub async fn generate(backend: &Backend, prompt: &str) -> Result<GeneratedAnswer, InferenceError> {
    info!("Performing RAG inference with model: {}", backend.model_id);

    let path = format!("_inference/completion/{}", backend.model_id);
    let resp = backend
        .post_json(&path, &json!({ "input": prompt }))
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(InferenceError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let data: Value = resp.json().await?;
    Ok(GeneratedAnswer {
        text: extract_answer(data),
    })
}

/// Pulls the answer text out of a decoded response, falling back to the
/// sentinel for anything unrecognized.
fn extract_answer(data: Value) -> String {
    let parsed: InferenceResponse =
        serde_json::from_value(data).unwrap_or_else(|_| InferenceResponse::Unrecognized(Value::Null));

    match parsed {
        InferenceResponse::Completion { completion } => completion
            .into_iter()
            .next()
            .map(|c| c.result)
            .unwrap_or_else(|| UNPARSEABLE_RESPONSE.to_string()),
        InferenceResponse::Choices { choices } => choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_else(|| UNPARSEABLE_RESPONSE.to_string()),
        InferenceResponse::Unrecognized(body) => {
            warn!("Unexpected inference response structure: {}", body);
            UNPARSEABLE_RESPONSE.to_string()
        }
    }
}
