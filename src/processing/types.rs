//! Core data types and error definitions for the pipelines.

use crate::document::ExtractError;
use crate::openai::OpenAiError;
use crate::search::SearchError;
use crate::storage::{LinkError, StorageError};
use thiserror::Error;

/// Errors produced while splitting extracted text into chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// Splitting was configured with a zero chunk size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// The configured overlap leaves no room for forward progress.
    #[error("chunk overlap must be smaller than the chunk size")]
    OverlapTooLarge,
}

/// Errors emitted by the ingestion and query pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document link failed validation.
    #[error("{0}")]
    Link(#[from] LinkError),
    /// Blob download failed.
    #[error("Failed to download document: {0}")]
    Storage(#[from] StorageError),
    /// Text extraction rejected the document.
    #[error("{0}")]
    Extract(#[from] ExtractError),
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding or chat provider failed.
    #[error("Azure OpenAI request failed: {0}")]
    OpenAi(#[from] OpenAiError),
    /// Search-index interaction failed.
    #[error("Search request failed: {0}")]
    Search(#[from] SearchError),
    /// Embedding provider returned no vector for the query.
    #[error("Embedding provider returned no vector for the query")]
    EmptyEmbedding,
}

impl PipelineError {
    /// Whether the failure was caused by the request itself rather than a
    /// backend, and should map to a client-error status.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Link(_))
    }
}

/// Summary of a completed ingestion.
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// Number of chunks embedded and indexed for the document.
    pub chunks_indexed: usize,
}
