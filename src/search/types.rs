//! Shared types used by the search-index client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned while interacting with the search service.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid search endpoint URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service responded with an unexpected status code.
    #[error("Unexpected search service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the search service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The service accepted the batch but rejected individual documents.
    #[error("Search service rejected {rejected} document(s) in the batch")]
    DocumentsRejected {
        /// Number of documents that failed to index.
        rejected: usize,
    },
}

/// A chunk document prepared for upsert into the index.
#[derive(Debug, Clone)]
pub struct IndexDocument {
    /// Generated document key.
    pub id: String,
    /// Chunk text stored in the index.
    pub content: String,
    /// Embedding vector for the chunk.
    pub vector: Vec<f32>,
    /// Name of the source blob, for traceability.
    pub source: Option<String>,
}

impl IndexDocument {
    /// Build a document with a freshly generated key.
    pub fn new(content: String, vector: Vec<f32>, source: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            vector,
            source,
        }
    }
}

/// Scored chunk returned by a vector search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Similarity score reported by the index.
    pub score: f32,
    /// Stored chunk text.
    pub content: String,
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub(crate) value: Vec<RawHit>,
}

#[derive(Deserialize)]
pub(crate) struct RawHit {
    #[serde(rename = "@search.score")]
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct IndexBatchResponse {
    #[serde(default)]
    pub(crate) value: Vec<IndexingResult>,
}

#[derive(Deserialize)]
pub(crate) struct IndexingResult {
    pub(crate) status: bool,
    #[serde(default)]
    pub(crate) key: Option<String>,
}
