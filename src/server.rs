//! HTTP boundary: upload and query endpoints.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload-pdf` | Accept one PDF upload and queue it for ingestion |
//! | `POST` | `/search_and_rag` | Answer a free-text question via retrieval + generation |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! The upload endpoint acknowledges immediately once the file is parked and
//! queued; ingestion outcome is observable only through logs and the index.
//! A saturated ingestion queue is backpressure: the upload is rejected with
//! `503` and the parked file is removed.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Query text is required." } }
//! ```
//!
//! Error codes: `bad_request` (400), `queue_full` (503), `retrieval_failed`
//! (500), `generation_failed` (500), `internal` (500).

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::backend::Backend;
use crate::config::Config;
use crate::ingest::IngestPool;
use crate::models::SourceDocument;
use crate::query::{self, QueryStage};

/// Multipart form field carrying the uploaded document.
const UPLOAD_FIELD: &str = "pdf_file";
/// Upload size cap (bytes). Manuals run large; 100 MB is generous.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<Backend>,
    pub pool: IngestPool,
}

/// Builds the application router. Split out of [`run_server`] so tests can
/// serve the same routes on an ephemeral port.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload-pdf", post(handle_upload))
        .route("/search_and_rag", post(handle_search_and_rag))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server: creates the upload and staging directories,
/// spawns the ingestion pool, and serves until the process is terminated.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.upload_dir)?;
    info!("Ensured upload dir exists: {}", config.upload_dir.display());
    std::fs::create_dir_all(&config.staging_dir)?;
    info!(
        "Ensured staging dir exists: {}",
        config.staging_dir.display()
    );

    let backend = Arc::new(Backend::new(&config)?);
    let pool = IngestPool::spawn(
        Arc::clone(&backend),
        config.staging_dir.clone(),
        config.ingest_workers,
        config.ingest_queue_depth,
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        backend,
        pool,
    };

    let app = build_router(state);
    info!("Server listening on http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn queue_full() -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "queue_full".to_string(),
        message: "Ingestion queue is full; retry later.".to_string(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /upload-pdf ============

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    filename: String,
    status: String,
}

/// Accepts one PDF via multipart form data, parks it in the upload
/// directory, and queues it for background ingestion. Responds without
/// waiting for processing.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_upload_field(&mut multipart).await?;

    // Only the basename of the client-supplied name is used, so a crafted
    // filename cannot escape the upload directory.
    let file_name = Path::new(&upload.file_name)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad_request("No selected file"))?;

    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(bad_request(
            "Invalid file type. Only PDF files are allowed.",
        ));
    }

    let path = state.config.upload_dir.join(&file_name);
    if let Err(e) = tokio::fs::write(&path, &upload.bytes).await {
        error!("Failed to save upload {}: {}", path.display(), e);
        let _ = tokio::fs::remove_file(&path).await;
        return Err(internal("Could not save uploaded file."));
    }
    info!(
        "File saved temporarily: {} (received {})",
        path.display(),
        upload.received_at
    );

    if state.pool.try_submit(path.clone()).is_err() {
        // Reject under backpressure and do not leave the file parked.
        let _ = tokio::fs::remove_file(&path).await;
        return Err(queue_full());
    }
    info!("Background processing initiated for {}", file_name);

    Ok(Json(UploadResponse {
        message: "PDF uploaded successfully and background processing initiated!".to_string(),
        filename: file_name,
        status: "processing".to_string(),
    }))
}

async fn read_upload_field(multipart: &mut Multipart) -> Result<SourceDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(bad_request("No selected file"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Could not read upload: {}", e)))?;
        return Ok(SourceDocument {
            file_name,
            bytes: bytes.to_vec(),
            received_at: Utc::now(),
        });
    }
    Err(bad_request("No file part in the request"))
}

// ============ POST /search_and_rag ============

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct QueryResponse {
    response: String,
}

/// Answers a free-text question. Empty queries are rejected here, before
/// the pipeline runs; pipeline failures map to `500` with the originating
/// stage in the error code.
async fn handle_search_and_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(bad_request("Query text is required."));
    }

    match query::answer(&state.backend, &request.query).await {
        Ok(answer) => Ok(Json(QueryResponse {
            response: answer.text,
        })),
        Err(e) => {
            error!("Query pipeline failed: {}", e);
            let code = match e.stage {
                QueryStage::Retrieving => "retrieval_failed",
                QueryStage::Generating => "generation_failed",
            };
            Err(AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: code.to_string(),
                message: e.to_string(),
            })
        }
    }
}
