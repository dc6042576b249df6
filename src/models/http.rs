//! Inference-runtime clients issuing JSON requests over HTTP.
//!
//! Each model is served under its own route (`/ocr`, `/summarize`, `/document-qa`) and receives
//! the model identifier in the payload, so one runtime can host all three.

use super::{
    DocumentQaModel, ModelError, OcrEngine, OcrLine, SummarizationModel, SummarizationRequest,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;

/// Shared transport for a single model hosted by the inference runtime.
#[derive(Clone)]
pub struct InferenceEndpoint {
    http: Client,
    base_url: String,
    model: String,
}

impl InferenceEndpoint {
    /// Build an endpoint for `model` served at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let http = Client::builder()
            .user_agent("docqa/inference")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                ModelError::Unavailable(format!("failed to construct HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{route}", self.base_url.trim_end_matches('/'))
    }

    async fn post_json(&self, route: &str, payload: Value) -> Result<Value, ModelError> {
        let url = self.endpoint(route);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                ModelError::Unavailable(format!(
                    "failed to reach inference runtime at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ModelError::Unavailable(format!(
                "inference endpoint {url} returned 404"
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::RequestFailed(format!(
                "{} returned {status}: {body}",
                self.model
            )));
        }

        response.json().await.map_err(|error| {
            ModelError::InvalidResponse(format!("failed to decode {route} response: {error}"))
        })
    }
}

/// OCR engine served by the inference runtime.
pub struct HttpOcrEngine {
    endpoint: InferenceEndpoint,
}

impl HttpOcrEngine {
    /// Wrap an endpoint configured for the OCR model.
    pub fn new(endpoint: InferenceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    async fn recognize(&self, path: &Path) -> Result<Vec<OcrLine>, ModelError> {
        let payload = json!({
            "model": self.endpoint.model(),
            "file_path": path.to_string_lossy(),
            "angle_classification": true,
        });
        let body = self.endpoint.post_json("ocr", payload).await?;
        // The runtime answers `null` when the detector finds no pages at all.
        if body.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(body).map_err(|error| {
            ModelError::InvalidResponse(format!("unexpected OCR result shape: {error}"))
        })
    }
}

/// Summarization model served by the inference runtime.
pub struct HttpSummarizationModel {
    endpoint: InferenceEndpoint,
}

impl HttpSummarizationModel {
    /// Wrap an endpoint configured for the summarization model.
    pub fn new(endpoint: InferenceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl SummarizationModel for HttpSummarizationModel {
    async fn summarize(&self, request: SummarizationRequest) -> Result<Value, ModelError> {
        let payload = json!({
            "model": self.endpoint.model(),
            "text": request.text,
            "max_length": request.max_length,
            "min_length": request.min_length,
            "do_sample": request.do_sample,
        });
        self.endpoint.post_json("summarize", payload).await
    }
}

/// DocVQA model served by the inference runtime.
pub struct HttpDocumentQaModel {
    endpoint: InferenceEndpoint,
}

impl HttpDocumentQaModel {
    /// Wrap an endpoint configured for the document QA model.
    pub fn new(endpoint: InferenceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl DocumentQaModel for HttpDocumentQaModel {
    async fn answer(&self, path: &Path, question: &str) -> Result<Value, ModelError> {
        let payload = json!({
            "model": self.endpoint.model(),
            "file_path": path.to_string_lossy(),
            "question": question,
        });
        self.endpoint.post_json("document-qa", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn endpoint(server: &MockServer, model: &str) -> InferenceEndpoint {
        InferenceEndpoint::new(server.base_url(), model, Duration::from_secs(5)).expect("endpoint")
    }

    #[tokio::test]
    async fn ocr_engine_decodes_regions() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/ocr")
                    .json_body_partial(r#"{"model":"ocr-test","file_path":"/tmp/scan.png"}"#);
                then.status(200).json_body(json!([
                    [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]], ["Total", 0.97]]]
                ]));
            })
            .await;

        let engine = HttpOcrEngine::new(endpoint(&server, "ocr-test"));
        let lines = engine
            .recognize(Path::new("/tmp/scan.png"))
            .await
            .expect("ocr lines");

        mock.assert_async().await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref().expect("regions")[0].text(), "Total");
    }

    #[tokio::test]
    async fn ocr_engine_treats_null_as_no_pages() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/ocr");
                then.status(200).json_body(Value::Null);
            })
            .await;

        let engine = HttpOcrEngine::new(endpoint(&server, "ocr-test"));
        let lines = engine
            .recognize(Path::new("/tmp/blank.png"))
            .await
            .expect("ocr lines");
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn summarization_request_carries_generation_bounds() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/summarize").json_body_partial(
                    r#"{"max_length":150,"min_length":30,"do_sample":false}"#,
                );
                then.status(200)
                    .json_body(json!([{ "summary_text": "Short." }]));
            })
            .await;

        let model = HttpSummarizationModel::new(endpoint(&server, "bart"));
        let value = model
            .summarize(SummarizationRequest {
                text: "Long text".into(),
                max_length: 150,
                min_length: 30,
                do_sample: false,
            })
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(value[0]["summary_text"], "Short.");
    }

    #[tokio::test]
    async fn error_status_becomes_request_failed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/document-qa");
                then.status(500).body("boom");
            })
            .await;

        let model = HttpDocumentQaModel::new(endpoint(&server, "donut"));
        let error = model
            .answer(Path::new("/tmp/doc.pdf"), "What is the total?")
            .await
            .expect_err("error response");

        assert!(matches!(error, ModelError::RequestFailed(message) if message.contains("500")));
    }

    #[tokio::test]
    async fn missing_route_is_unavailable() {
        let server = MockServer::start_async().await;
        let model = HttpDocumentQaModel::new(endpoint(&server, "donut"));
        let error = model
            .answer(Path::new("/tmp/doc.pdf"), "Who signed?")
            .await
            .expect_err("no mock registered");
        assert!(matches!(error, ModelError::Unavailable(_)));
    }
}
