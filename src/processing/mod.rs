//! Ingestion and query pipelines.
//!
//! [`PipelineService`] wires the capability clients (blob storage, document
//! extraction, embeddings, vector index, chat) into the two request-scoped
//! flows exposed over HTTP.

pub(crate) mod chunking;
mod service;
mod types;

pub use service::{PipelineApi, PipelineService};
pub use types::{ChunkingError, IngestOutcome, PipelineError};
