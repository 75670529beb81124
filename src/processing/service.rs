//! Pipeline service coordinating storage, extraction, embedding, search, and chat.

use crate::{
    config::get_config,
    document::extract_text,
    metrics::{MetricsSnapshot, PipelineMetrics},
    openai::{AzureOpenAiClient, ChatClient, ChatMessage, EmbeddingClient},
    processing::{
        chunking::split_text,
        types::{IngestOutcome, PipelineError},
    },
    search::{IndexDocument, SearchClient, SearchHit, VectorIndex},
    storage::{BlobClient, BlobStore, DocumentLink},
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Number of nearest neighbors requested per query.
const TOP_K: usize = 10;
/// Sampling temperature used for grounded answers.
const CHAT_TEMPERATURE: f32 = 0.25;

/// Coordinates the two request-scoped pipelines: document ingestion and
/// grounded question answering.
///
/// The service owns long-lived handles to the blob store, the embedding and
/// chat clients, and the search index. Construct it once near process start
/// and share it through an `Arc`.
pub struct PipelineService {
    blob_store: Arc<dyn BlobStore>,
    embedding_client: Arc<dyn EmbeddingClient>,
    chat_client: Arc<dyn ChatClient>,
    vector_index: Arc<dyn VectorIndex>,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipelines consumed by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Download, extract, chunk, embed, and index the linked document.
    async fn ingest(&self, doc_link: &str) -> Result<IngestOutcome, PipelineError>;

    /// Answer a query grounded in the named index, or `None` when the model
    /// returned empty content.
    async fn answer(&self, query: &str, index_name: &str)
    -> Result<Option<String>, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build a new pipeline service from the loaded configuration.
    pub fn new() -> Self {
        let config = get_config();
        let http = Client::builder()
            .user_agent(concat!("ragbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to construct HTTP client");

        let openai = Arc::new(AzureOpenAiClient::new(http.clone()));
        Self {
            blob_store: Arc::new(BlobClient::new(http.clone(), config.storage.clone())),
            embedding_client: openai.clone(),
            chat_client: openai,
            vector_index: Arc::new(
                SearchClient::new(http).expect("Failed to initialize search client"),
            ),
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Validate the link, download the blob, and index its chunks.
    pub async fn ingest(&self, doc_link: &str) -> Result<IngestOutcome, PipelineError> {
        let link = DocumentLink::parse(doc_link)?;
        tracing::info!(
            container = %link.container,
            blob = %link.blob_name,
            kind = ?link.kind,
            "Processing document"
        );

        let bytes = self
            .blob_store
            .download(&link.container, &link.blob_name)
            .await?;
        let text = extract_text(link.kind, &bytes)?;

        let config = get_config();
        let chunks = split_text(&text, config.chunk_size, config.chunk_overlap)?;
        if chunks.is_empty() {
            tracing::info!(blob = %link.blob_name, "Document produced no chunks");
            self.metrics.record_ingestion(0);
            return Ok(IngestOutcome { chunks_indexed: 0 });
        }

        let embeddings = self.embedding_client.embed(chunks.clone()).await?;
        debug_assert_eq!(chunks.len(), embeddings.len());

        let documents: Vec<IndexDocument> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexDocument::new(chunk, vector, Some(link.blob_name.clone())))
            .collect();

        let indexed = self
            .vector_index
            .upsert_documents(&config.index_name, documents)
            .await?;

        self.metrics.record_ingestion(indexed);
        tracing::info!(
            index = %config.index_name,
            chunks = indexed,
            "Document indexed"
        );

        Ok(IngestOutcome {
            chunks_indexed: indexed,
        })
    }

    /// Embed the query, retrieve grounding context, and ask the chat model.
    pub async fn answer(
        &self,
        query: &str,
        index_name: &str,
    ) -> Result<Option<String>, PipelineError> {
        let config = get_config();

        let mut vectors = self.embedding_client.embed(vec![query.to_string()]).await?;
        let vector = vectors.pop().ok_or(PipelineError::EmptyEmbedding)?;

        let hits = self
            .vector_index
            .vector_search(index_name, vector, TOP_K)
            .await?;
        tracing::debug!(index = index_name, hits = hits.len(), "Vector search completed");

        let grounding = build_grounding_message(&config.system_message_template, &hits);
        let messages = vec![ChatMessage::system(grounding), ChatMessage::user(query)];

        let reply = self.chat_client.complete(messages, CHAT_TEMPERATURE).await?;
        self.metrics.record_query();
        Ok(reply
            .map(|text| text.replace('\n', ""))
            .filter(|text| !text.is_empty()))
    }

    /// Return the current ingestion metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn ingest(&self, doc_link: &str) -> Result<IngestOutcome, PipelineError> {
        PipelineService::ingest(self, doc_link).await
    }

    async fn answer(
        &self,
        query: &str,
        index_name: &str,
    ) -> Result<Option<String>, PipelineError> {
        PipelineService::answer(self, query, index_name).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PipelineService::metrics_snapshot(self)
    }
}

/// Assemble the system-role grounding message from retrieved chunks.
///
/// With no hits the bare template is used; otherwise the chunk contents are
/// appended under a `Content:` section, joined by newlines.
fn build_grounding_message(template: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return template.to_string();
    }
    let contents: Vec<&str> = hits.iter().map(|hit| hit.content.as_str()).collect();
    format!("{template}\n\nContent:\n{}", contents.join("\n"))
}
