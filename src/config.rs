//! Environment-driven configuration.
//!
//! All settings come from the process environment. The search backend
//! location, index name, and API key are hard preconditions for both
//! pipelines; [`Config::from_env`] fails fast, naming every missing
//! variable, before any directory or network work begins.

use anyhow::{bail, Result};
use std::path::PathBuf;

const DEFAULT_MODEL_ID: &str = "openai_chat_completions";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_STAGING_DIR: &str = "created_output";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_INGEST_WORKERS: usize = 2;
const DEFAULT_INGEST_QUEUE_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the search/inference backend (Elasticsearch-compatible).
    pub search_url: String,
    /// Name of the index holding page records.
    pub index_name: String,
    /// API key sent as `Authorization: ApiKey <key>` on every backend call.
    pub api_key: String,
    /// Completion model identifier for the inference endpoint.
    pub model_id: String,
    /// Directory where uploads are parked until the coordinator consumes them.
    pub upload_dir: PathBuf,
    /// Staging directory holding split page units.
    pub staging_dir: PathBuf,
    /// HTTP server bind address.
    pub bind_addr: String,
    /// Timeout applied to every outbound backend request.
    pub request_timeout_secs: u64,
    /// Number of ingestion worker tasks.
    pub ingest_workers: usize,
    /// Capacity of the ingestion queue; uploads beyond it are rejected.
    pub ingest_queue_depth: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Split out from
    /// [`Config::from_env`] so tests can supply variables without touching
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |name: &str| -> String {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        };

        let search_url = required("ELASTICSEARCH_URL");
        let index_name = required("INDEX_NAME");
        let api_key = required("API_KEY");

        if !missing.is_empty() {
            bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let config = Self {
            search_url: search_url.trim_end_matches('/').to_string(),
            index_name,
            api_key,
            model_id: lookup("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            staging_dir: lookup("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR)),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            request_timeout_secs: parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            ingest_workers: parse_var(&lookup, "INGEST_WORKERS", DEFAULT_INGEST_WORKERS)?,
            ingest_queue_depth: parse_var(
                &lookup,
                "INGEST_QUEUE_DEPTH",
                DEFAULT_INGEST_QUEUE_DEPTH,
            )?,
        };

        if config.ingest_workers == 0 {
            bail!("INGEST_WORKERS must be > 0");
        }
        if config.ingest_queue_depth == 0 {
            bail!("INGEST_QUEUE_DEPTH must be > 0");
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) => match raw.trim().parse() {
            Ok(v) => Ok(v),
            Err(_) => bail!("{} must be a number, got '{}'", name, raw),
        },
        None => Ok(default),
    }
}
