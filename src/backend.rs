//! Shared client handle for the search/inference backend.
//!
//! The index writer, retriever, and generator all talk to the same
//! Elasticsearch-compatible backend; this module owns the single reqwest
//! client (with the configured request timeout) and the auth header so the
//! call sites stay focused on their wire contracts.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pub index_name: String,
    pub model_id: String,
}

impl Backend {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            http,
            base_url: config.search_url.clone(),
            api_key: config.api_key.clone(),
            index_name: config.index_name.clone(),
            model_id: config.model_id.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// HEAD request with auth, used for index existence checks.
    pub fn head(&self, path: &str) -> reqwest::RequestBuilder {
        self.authed(self.http.head(self.url(path)))
    }

    /// PUT request with auth and a JSON body.
    pub fn put_json(&self, path: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.authed(self.http.put(self.url(path)).json(body))
    }

    /// POST request with auth and a JSON body.
    pub fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.authed(self.http.post(self.url(path)).json(body))
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("Authorization", format!("ApiKey {}", self.api_key))
    }
}
