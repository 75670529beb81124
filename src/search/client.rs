//! HTTP client wrapper for the hosted search index.

use crate::config::get_config;
use crate::search::types::{
    IndexBatchResponse, IndexDocument, SearchError, SearchHit, SearchResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};

/// Name of the index field that stores chunk embeddings.
const VECTOR_FIELD: &str = "content_vector";
/// Fields requested back from the index on search.
const SELECT_FIELDS: &str = "content";

/// Interface implemented by vector-index backends.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert chunk documents into the named index, returning the accepted count.
    async fn upsert_documents(
        &self,
        index_name: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<usize, SearchError>;

    /// Run a top-`k` similarity search over the vector field of the named index.
    async fn vector_search(
        &self,
        index_name: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

/// Lightweight HTTP client for search-index operations.
pub struct SearchClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) api_version: String,
}

impl SearchClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new(client: Client) -> Result<Self, SearchError> {
        let config = get_config();
        let base_url =
            normalize_base_url(&config.search_endpoint).map_err(SearchError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized search-index HTTP client");

        Ok(Self {
            client,
            base_url,
            api_key: config.search_api_key.clone(),
            api_version: config.search_api_version.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
    }
}

#[async_trait]
impl VectorIndex for SearchClient {
    async fn upsert_documents(
        &self,
        index_name: &str,
        documents: Vec<IndexDocument>,
    ) -> Result<usize, SearchError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let actions: Vec<Value> = documents
            .into_iter()
            .map(|document| {
                json!({
                    "@search.action": "mergeOrUpload",
                    "id": document.id,
                    "content": document.content,
                    "content_vector": document.vector,
                    "source": document.source,
                })
            })
            .collect();
        let document_count = actions.len();

        let response = self
            .request(Method::POST, &format!("indexes/{index_name}/docs/index"))
            .json(&json!({ "value": actions }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(index = index_name, error = %error, "Document upsert failed");
            return Err(error);
        }

        let payload: IndexBatchResponse = response.json().await?;
        let rejected = payload.value.iter().filter(|result| !result.status).count();
        if rejected > 0 {
            let first_key = payload
                .value
                .iter()
                .find(|result| !result.status)
                .and_then(|result| result.key.clone());
            tracing::error!(
                index = index_name,
                rejected,
                first_key = ?first_key,
                "Search service rejected documents"
            );
            return Err(SearchError::DocumentsRejected { rejected });
        }

        tracing::debug!(
            index = index_name,
            documents = document_count,
            "Documents indexed"
        );
        Ok(document_count)
    }

    async fn vector_search(
        &self,
        index_name: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let body = json!({
            "select": SELECT_FIELDS,
            "vectorQueries": [
                {
                    "kind": "vector",
                    "vector": vector,
                    "fields": VECTOR_FIELD,
                    "k": k,
                }
            ],
        });

        let response = self
            .request(Method::POST, &format!("indexes/{index_name}/docs/search"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::error!(index = index_name, error = %error, "Vector search failed");
            return Err(error);
        }

        let payload: SearchResponse = response.json().await?;
        let hits = payload
            .value
            .into_iter()
            .filter_map(|hit| {
                hit.content.map(|content| SearchHit {
                    score: hit.score,
                    content,
                })
            })
            .collect();

        Ok(hits)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn test_client(base_url: String) -> SearchClient {
        SearchClient {
            client: Client::builder()
                .user_agent("ragbridge-test")
                .build()
                .expect("client"),
            base_url,
            api_key: "search-secret".into(),
            api_version: "2024-07-01".into(),
        }
    }

    #[tokio::test]
    async fn upsert_emits_one_action_per_document() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes/kb/docs/index")
                    .query_param("api-version", "2024-07-01")
                    .header("api-key", "search-secret")
                    .body_contains("mergeOrUpload")
                    .body_contains("\"content\":\"alpha\"")
                    .body_contains("\"content\":\"beta\"");
                then.status(200).json_body(json!({
                    "value": [
                        { "key": "1", "status": true, "statusCode": 201 },
                        { "key": "2", "status": true, "statusCode": 201 }
                    ]
                }));
            })
            .await;

        let client = test_client(server.base_url());
        let accepted = client
            .upsert_documents(
                "kb",
                vec![
                    IndexDocument::new("alpha".into(), vec![0.1, 0.2], Some("doc.pdf".into())),
                    IndexDocument::new("beta".into(), vec![0.3, 0.4], Some("doc.pdf".into())),
                ],
            )
            .await
            .expect("upsert succeeds");

        mock.assert();
        assert_eq!(accepted, 2);
    }

    #[tokio::test]
    async fn upsert_surfaces_rejected_documents() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/kb/docs/index");
                then.status(200).json_body(json!({
                    "value": [
                        { "key": "1", "status": true, "statusCode": 201 },
                        { "key": "2", "status": false, "statusCode": 422 }
                    ]
                }));
            })
            .await;

        let client = test_client(server.base_url());
        let error = client
            .upsert_documents(
                "kb",
                vec![IndexDocument::new("alpha".into(), vec![0.1], None)],
            )
            .await
            .expect_err("partial rejection is an error");
        assert!(matches!(error, SearchError::DocumentsRejected { rejected: 1 }));
    }

    #[tokio::test]
    async fn vector_search_emits_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes/kb/docs/search")
                    .body_contains("\"fields\":\"content_vector\"")
                    .body_contains("\"k\":10");
                then.status(200).json_body(json!({
                    "value": [
                        { "@search.score": 0.91, "content": "First chunk" },
                        { "@search.score": 0.87, "content": "Second chunk" },
                        { "@search.score": 0.10 }
                    ]
                }));
            })
            .await;

        let client = test_client(server.base_url());
        let hits = client
            .vector_search("kb", vec![0.1, 0.2], 10)
            .await
            .expect("search succeeds");

        mock.assert();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "First chunk");
        assert!((hits[0].score - 0.91).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn search_error_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/kb/docs/search");
                then.status(404).body("index not found");
            })
            .await;

        let client = test_client(server.base_url());
        let error = client
            .vector_search("kb", vec![0.1], 10)
            .await
            .expect_err("missing index surfaces");
        assert!(matches!(error, SearchError::UnexpectedStatus { .. }));
    }
}
