//! # docrag
//!
//! A PDF ingestion and retrieval-augmented question answering service.
//!
//! docrag ingests multi-page PDF manuals into a semantic search index and
//! answers natural-language questions by retrieving relevant passages and
//! conditioning a completion model on them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────────────┐   ┌───────────────┐
//! │  Upload  │──▶│ Ingest pool: split → extract │──▶│  Search index  │
//! │  (HTTP)  │   │        → upsert              │   │ (Elasticsearch)│
//! └──────────┘   └──────────────────────────────┘   └───────┬───────┘
//!                                                           │
//! ┌──────────┐   ┌──────────────────────────────┐           │
//! │  Query   │──▶│ retrieve → prompt → generate │◀──────────┘
//! │  (HTTP)  │   └──────────────────────────────┘
//! └──────────┘
//! ```
//!
//! The two paths share only the index: page records written by ingestion
//! become visible to retrieval.
//!
//! ## Quick Start
//!
//! ```bash
//! export ELASTICSEARCH_URL=https://example.es.cloud:443
//! export INDEX_NAME=pdf-documentation-reader
//! export API_KEY=...
//! docrag serve                        # start the HTTP server
//! docrag ingest ./fridge-manual.pdf   # one-shot ingestion
//! docrag query "ice maker not working"
//! docrag reconcile                    # re-index everything in staging
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Environment-driven configuration |
//! | [`models`] | Core data types |
//! | [`split`] | Page decomposition into single-page units |
//! | [`extract`] | Plain-text extraction from page units |
//! | [`backend`] | Shared search/inference backend client |
//! | [`index`] | Index creation and per-page upserts |
//! | [`search`] | Semantic retrieval |
//! | [`prompt`] | Grounded prompt assembly |
//! | [`infer`] | Completion generation |
//! | [`ingest`] | Ingestion coordinator and worker pool |
//! | [`query`] | Query orchestration |
//! | [`server`] | HTTP boundary |

pub mod backend;
pub mod config;
pub mod extract;
pub mod index;
pub mod infer;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod query;
pub mod search;
pub mod server;
pub mod split;
