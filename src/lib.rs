#![deny(missing_docs)]

//! Core library for the ragbridge knowledge-base gateway.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document text extraction (PDF and DOCX).
pub mod document;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline metrics counters.
pub mod metrics;
/// Azure OpenAI embedding and chat-completion clients.
pub mod openai;
/// Ingestion and query pipelines.
pub mod processing;
/// Hosted search-index integration.
pub mod search;
/// Blob storage access and document-link validation.
pub mod storage;
