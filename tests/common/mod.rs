//! Shared test fixtures: an in-process stand-in for the search/inference
//! backend, and PDF builders for exercising the split/extract pipeline.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use docrag::backend::Backend;
use docrag::config::Config;

/// Observable state of the stub backend.
#[derive(Default)]
pub struct StubState {
    /// Upserted documents keyed by identifier; an upsert replaces.
    pub docs: BTreeMap<String, Value>,
    /// Canned hits returned by `_search`.
    pub hits: Vec<Value>,
    /// When set, `_search` answers 500.
    pub fail_search: bool,
    /// While set, index existence checks stall instead of answering.
    pub hold_index_meta: bool,
    /// Number of index existence checks received.
    pub index_meta_calls: usize,
    /// Prompts received by the inference endpoint.
    pub inference_inputs: Vec<String>,
}

pub type SharedStub = Arc<Mutex<StubState>>;

/// Starts the stub backend on an ephemeral port and returns its base URL
/// plus a handle to its state.
pub async fn spawn_stub_backend() -> (String, SharedStub) {
    let state: SharedStub = Arc::new(Mutex::new(StubState::default()));

    let app = Router::new()
        .route("/_inference/completion/{model}", post(handle_inference))
        .route("/{index}", get(handle_index_meta).put(handle_index_meta))
        .route("/{index}/_search", post(handle_search))
        .route("/{index}/_doc/{id}", put(handle_upsert))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

async fn handle_index_meta(State(state): State<SharedStub>) -> StatusCode {
    state.lock().unwrap().index_meta_calls += 1;
    while state.lock().unwrap().hold_index_meta {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    StatusCode::OK
}

async fn handle_upsert(
    State(state): State<SharedStub>,
    Path((_index, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.lock().unwrap().docs.insert(id.clone(), body);
    Json(json!({ "_id": id, "result": "created" }))
}

async fn handle_search(
    State(state): State<SharedStub>,
    Path(_index): Path<String>,
    Json(_body): Json<Value>,
) -> Response {
    let stub = state.lock().unwrap();
    if stub.fail_search {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "search backend unavailable" })),
        )
            .into_response();
    }
    Json(json!({ "hits": { "hits": stub.hits } })).into_response()
}

async fn handle_inference(
    State(state): State<SharedStub>,
    Path(_model): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let input = body["input"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().inference_inputs.push(input);
    Json(json!({ "completion": [{ "result": "stub answer" }] }))
}

/// A search hit in the backend's wire shape.
pub fn hit(body: &str, score: f64) -> Value {
    json!({
        "_score": score,
        "_source": { "body": body },
        "highlight": { "body": [body] }
    })
}

/// Config pointing at the stub backend, with upload/staging dirs under
/// `root`.
pub fn test_config(backend_url: &str, root: &std::path::Path) -> Config {
    let upload_dir = root.join("uploads").display().to_string();
    let staging_dir = root.join("created_output").display().to_string();
    let url = backend_url.to_string();
    Config::from_lookup(move |name| match name {
        "ELASTICSEARCH_URL" => Some(url.clone()),
        "INDEX_NAME" => Some("pdf-documentation-reader".to_string()),
        "API_KEY" => Some("test-key".to_string()),
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        "STAGING_DIR" => Some(staging_dir.clone()),
        "REQUEST_TIMEOUT_SECS" => Some("10".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn test_backend(config: &Config) -> Backend {
    Backend::new(config).unwrap()
}

/// Builds a PDF with one page per entry of `page_texts` and returns its
/// bytes.
pub fn multi_page_pdf(page_texts: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Polls `predicate` until it holds or the deadline passes.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..100 {
        if predicate() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("condition not reached within deadline");
}
