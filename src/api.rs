//! HTTP surface for the document service.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /process-document` – Extract text from a file already on the host and summarize it when
//!   long enough. Returns `{ "summary": string | null, "text": string }`.
//! - `POST /ask-document` – Answer a question about a file. Spreadsheets are searched by keyword;
//!   other files go to the DocVQA model. Returns `{ "answer": string }`.
//! - `GET /metrics` – Observe request counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Errors render as `{ "detail": message }`: 400 for request problems (missing fields, missing
//! file, nothing extracted) and 500 for everything else.

use crate::metrics::MetricsSnapshot;
use crate::processing::{DocumentAnswer, DocumentApi, DocumentError, ProcessedDocument};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the document API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/process-document", post(process_document::<S>))
        .route("/ask-document", post(ask_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /process-document` endpoint.
#[derive(Deserialize)]
struct ProcessRequest {
    /// Path of a file resident on the host filesystem.
    file_path: String,
}

/// Request body for the `POST /ask-document` endpoint.
#[derive(Deserialize)]
struct AskRequest {
    /// Free-text question.
    #[serde(default)]
    question: String,
    /// Path of a file resident on the host filesystem.
    #[serde(default)]
    file_path: Option<String>,
}

/// Extract text from a document and attach a summary when the text is long enough.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessedDocument>, AppError>
where
    S: DocumentApi,
{
    let processed = service.process_document(&request.file_path).await?;
    Ok(Json(processed))
}

/// Answer a question about a document.
async fn ask_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<DocumentAnswer>, AppError>
where
    S: DocumentApi,
{
    let answer = service
        .ask_document(&request.question, request.file_path.as_deref())
        .await?;
    Ok(Json(answer))
}

/// Return the request counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "process_document",
                method: "POST",
                path: "/process-document",
                description: "Extract text from a PDF, image, or spreadsheet and summarize it when longer than 200 characters. Response returns { \"summary\": string | null, \"text\": string }.",
                request_example: Some(json!({ "file_path": "/srv/uploads/invoice.pdf" })),
            },
            CommandDescriptor {
                name: "ask_document",
                method: "POST",
                path: "/ask-document",
                description: "Answer a question about a file. Spreadsheets are searched by keyword, other files use the DocVQA model. Response returns { \"answer\": string }.",
                request_example: Some(json!({
                    "question": "What is the invoice total?",
                    "file_path": "/srv/uploads/invoice.pdf"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return request counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

struct AppError(DocumentError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

impl From<DocumentError> for AppError {
    fn from(inner: DocumentError) -> Self {
        Self(inner)
    }
}
