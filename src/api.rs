//! HTTP surface for ragbridge.
//!
//! This module exposes a compact Axum router with the service endpoints:
//!
//! - `POST /ingest` – Download a linked document, extract its text, and index
//!   the resulting chunks. Responds with `{"status", "error"}`.
//! - `GET /query` – Answer a free-text question grounded in a named index.
//!   Responds with `{"response", "error"}`.
//! - `GET /metrics` – Observe ingestion counters.
//!
//! Each pipeline endpoint accepts exactly one method; other methods receive a
//! 405 carrying the endpoint's own envelope. Failures are logged before the
//! response body is constructed so operational visibility does not depend on
//! clients inspecting it.

use crate::metrics::MetricsSnapshot;
use crate::processing::PipelineApi;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build the HTTP router exposing the ingestion and query pipelines.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    Router::new()
        .route(
            "/ingest",
            post(ingest_document::<S>).fallback(ingest_method_not_allowed),
        )
        .route(
            "/query",
            get(answer_query::<S>).fallback(query_method_not_allowed),
        )
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Request body for the `POST /ingest` endpoint.
#[derive(Deserialize)]
struct IngestRequest {
    /// URL of the blob-stored document to index.
    doc_link: String,
}

/// Response envelope for the `POST /ingest` endpoint.
#[derive(Serialize)]
struct IngestEnvelope {
    status: &'static str,
    error: Option<String>,
}

/// Response envelope for the `GET /query` endpoint.
#[derive(Serialize)]
struct QueryEnvelope {
    response: Option<String>,
    error: Option<String>,
}

/// Query parameters accepted by the `GET /query` endpoint.
#[derive(Deserialize)]
struct QueryParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    index_name: Option<String>,
}

const MISSING_PARAMS_MESSAGE: &str =
    "Missing required query parameters: 'query' and 'index_name'";
const INVALID_BODY_MESSAGE: &str = "Invalid request body: expected JSON with a 'doc_link' field";
const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// Index a linked document into the configured index.
async fn ingest_document<S>(
    State(service): State<Arc<S>>,
    body: Option<Json<IngestRequest>>,
) -> Response
where
    S: PipelineApi,
{
    let Some(Json(request)) = body else {
        tracing::error!(error = INVALID_BODY_MESSAGE, "Rejected ingest request");
        return ingest_failure(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE);
    };

    match service.ingest(&request.doc_link).await {
        Ok(outcome) => {
            tracing::info!(
                chunks = outcome.chunks_indexed,
                "Ingest request completed"
            );
            (
                StatusCode::OK,
                Json(IngestEnvelope {
                    status: "COMPLETED",
                    error: None,
                }),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!(error = %error, doc_link = %request.doc_link, "Ingest request failed");
            let status = if error.is_request_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            ingest_failure(status, &error.to_string())
        }
    }
}

/// Answer a query grounded in the named index.
async fn answer_query<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<QueryParams>,
) -> Response
where
    S: PipelineApi,
{
    let query = params.query.filter(|value| !value.trim().is_empty());
    let index_name = params.index_name.filter(|value| !value.trim().is_empty());
    let (Some(query), Some(index_name)) = (query, index_name) else {
        tracing::error!(error = MISSING_PARAMS_MESSAGE, "Rejected query request");
        return query_failure(StatusCode::BAD_REQUEST, MISSING_PARAMS_MESSAGE);
    };

    match service.answer(&query, &index_name).await {
        Ok(answer) => {
            tracing::info!(index = %index_name, answered = answer.is_some(), "Query request completed");
            (
                StatusCode::OK,
                Json(QueryEnvelope {
                    response: answer,
                    error: None,
                }),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!(error = %error, index = %index_name, "Query request failed");
            query_failure(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
        }
    }
}

/// Return a concise metrics snapshot with document/chunk counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: PipelineApi,
{
    Json(service.metrics_snapshot())
}

async fn ingest_method_not_allowed() -> Response {
    ingest_failure(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
}

async fn query_method_not_allowed() -> Response {
    query_failure(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
}

fn ingest_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(IngestEnvelope {
            status: "FAILED",
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

fn query_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(QueryEnvelope {
            response: None,
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::metrics::MetricsSnapshot;
    use crate::processing::{IngestOutcome, PipelineApi, PipelineError};
    use crate::storage::LinkError;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug)]
    enum Call {
        Ingest(String),
        Answer(String, String),
    }

    struct StubPipeline {
        ingest_result: Result<IngestOutcome, LinkError>,
        answer_result: Option<String>,
        fail_answer: bool,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl StubPipeline {
        fn ok() -> Self {
            Self {
                ingest_result: Ok(IngestOutcome { chunks_indexed: 3 }),
                answer_result: Some("stub answer".into()),
                fail_answer: false,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl PipelineApi for StubPipeline {
        async fn ingest(&self, doc_link: &str) -> Result<IngestOutcome, PipelineError> {
            self.calls
                .lock()
                .await
                .push(Call::Ingest(doc_link.to_string()));
            self.ingest_result
                .clone()
                .map_err(PipelineError::from)
        }

        async fn answer(
            &self,
            query: &str,
            index_name: &str,
        ) -> Result<Option<String>, PipelineError> {
            self.calls
                .lock()
                .await
                .push(Call::Answer(query.to_string(), index_name.to_string()));
            if self.fail_answer {
                return Err(PipelineError::EmptyEmbedding);
            }
            Ok(self.answer_result.clone())
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_indexed: 7,
                chunks_indexed: 21,
                queries_answered: 2,
            }
        }
    }

    async fn send(
        service: Arc<StubPipeline>,
        request: Request<Body>,
    ) -> (StatusCode, Value) {
        let app = create_router(service);
        let response = app.oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    #[tokio::test]
    async fn ingest_rejects_non_post_methods() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let service = Arc::new(StubPipeline::ok());
            let (status, body) = send(
                service.clone(),
                Request::builder()
                    .method(method.clone())
                    .uri("/ingest")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {method}");
            assert_eq!(body["status"], "FAILED");
            assert_eq!(body["error"], "Method Not Allowed");
            assert!(service.calls.lock().await.is_empty());
        }
    }

    #[tokio::test]
    async fn query_rejects_non_get_methods() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let service = Arc::new(StubPipeline::ok());
            let (status, body) = send(
                service.clone(),
                Request::builder()
                    .method(method)
                    .uri("/query?query=a&index_name=b")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body["response"], Value::Null);
            assert_eq!(body["error"], "Method Not Allowed");
        }
    }

    #[tokio::test]
    async fn ingest_success_returns_completed_envelope() {
        let service = Arc::new(StubPipeline::ok());
        let (status, body) = send(
            service.clone(),
            Request::builder()
                .method(Method::POST)
                .uri("/ingest")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "doc_link": "https://acct.blob.core.windows.net/docs/a.pdf" })
                        .to_string(),
                ))
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "COMPLETED", "error": null }));

        let calls = service.calls.lock().await;
        assert!(matches!(
            calls.as_slice(),
            [Call::Ingest(link)] if link == "https://acct.blob.core.windows.net/docs/a.pdf"
        ));
    }

    #[tokio::test]
    async fn ingest_maps_link_errors_to_bad_request() {
        let service = Arc::new(StubPipeline {
            ingest_result: Err(LinkError::UnsupportedExtension),
            ..StubPipeline::ok()
        });
        let (status, body) = send(
            service,
            Request::builder()
                .method(Method::POST)
                .uri("/ingest")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "doc_link": "https://acct.blob.core.windows.net/docs/a.txt" })
                        .to_string(),
                ))
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "FAILED");
        assert_eq!(
            body["error"],
            "Invalid or unsupported file link: only .pdf and .docx files are allowed"
        );
    }

    #[tokio::test]
    async fn ingest_rejects_bodies_without_doc_link() {
        let service = Arc::new(StubPipeline::ok());
        let (status, body) = send(
            service.clone(),
            Request::builder()
                .method(Method::POST)
                .uri("/ingest")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "link": "nope" }).to_string()))
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "FAILED");
        assert!(service.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn query_requires_both_parameters() {
        for uri in ["/query", "/query?query=hello", "/query?index_name=kb"] {
            let service = Arc::new(StubPipeline::ok());
            let (status, body) = send(
                service.clone(),
                Request::builder()
                    .method(Method::GET)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
            assert_eq!(
                body["error"],
                "Missing required query parameters: 'query' and 'index_name'"
            );
            assert!(service.calls.lock().await.is_empty());
        }
    }

    #[tokio::test]
    async fn query_success_forwards_parameters_and_answer() {
        let service = Arc::new(StubPipeline::ok());
        let (status, body) = send(
            service.clone(),
            Request::builder()
                .method(Method::GET)
                .uri("/query?query=what%20is%20ragbridge&index_name=kb-index")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "stub answer", "error": null }));

        let calls = service.calls.lock().await;
        assert!(matches!(
            calls.as_slice(),
            [Call::Answer(query, index)] if query == "what is ragbridge" && index == "kb-index"
        ));
    }

    #[tokio::test]
    async fn query_empty_answer_is_null_with_null_error() {
        let service = Arc::new(StubPipeline {
            answer_result: None,
            ..StubPipeline::ok()
        });
        let (status, body) = send(
            service,
            Request::builder()
                .method(Method::GET)
                .uri("/query?query=a&index_name=b")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": null, "error": null }));
    }

    #[tokio::test]
    async fn query_pipeline_failure_maps_to_internal_error() {
        let service = Arc::new(StubPipeline {
            fail_answer: true,
            ..StubPipeline::ok()
        });
        let (status, body) = send(
            service,
            Request::builder()
                .method(Method::GET)
                .uri("/query?query=a&index_name=b")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["response"], Value::Null);
        assert!(
            body["error"]
                .as_str()
                .expect("error message")
                .contains("no vector")
        );
    }

    #[tokio::test]
    async fn metrics_reports_counters() {
        let service = Arc::new(StubPipeline::ok());
        let (status, body) = send(
            service,
            Request::builder()
                .method(Method::GET)
                .uri("/metrics")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents_indexed"], 7);
        assert_eq!(body["chunks_indexed"], 21);
        assert_eq!(body["queries_answered"], 2);
    }
}
