//! Model runtime abstractions: OCR, abstractive summarization, and document question answering.
//!
//! Heavy models live in an external inference runtime. The traits below are the seams the
//! processing layer depends on; [`http`] provides the runtime-backed implementations and
//! [`ModelRegistry`] constructs each of them at most once per process.

pub mod http;
mod registry;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub use registry::{HttpModelFactory, ModelFactory, ModelRegistry};

/// Errors surfaced by model backends.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Runtime was unreachable or the model endpoint does not exist.
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    /// Runtime answered with an error status.
    #[error("Model request failed: {0}")]
    RequestFailed(String),
    /// Runtime response could not be decoded.
    #[error("Malformed model response: {0}")]
    InvalidResponse(String),
}

/// Text recognized inside one detected region, with the recognizer's confidence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognizedText(pub String, pub f32);

/// A detected word or phrase region: its bounding polygon and recognized text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OcrRegion(pub Vec<[f32; 2]>, pub RecognizedText);

impl OcrRegion {
    /// Build a region without geometry.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self(Vec::new(), RecognizedText(text.into(), confidence))
    }

    /// Recognized text of the region.
    pub fn text(&self) -> &str {
        &self.1.0
    }
}

/// One detected line (or page block) of regions; `None` when the detector found nothing there.
pub type OcrLine = Option<Vec<OcrRegion>>;

/// Bounded summarization request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizationRequest {
    /// Input text, already truncated by the caller.
    pub text: String,
    /// Upper bound on generated tokens.
    pub max_length: usize,
    /// Lower bound on generated tokens.
    pub min_length: usize,
    /// Whether the model may sample; `false` requests deterministic decoding.
    pub do_sample: bool,
}

/// Line-and-block text detection and recognition over PDFs and raster images.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Run detection and recognition over the file.
    async fn recognize(&self, path: &Path) -> Result<Vec<OcrLine>, ModelError>;
}

/// Abstractive summarization model.
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    /// Summarize the request text. The output shape is model dependent.
    async fn summarize(&self, request: SummarizationRequest) -> Result<Value, ModelError>;
}

/// Document visual question answering model.
#[async_trait]
pub trait DocumentQaModel: Send + Sync {
    /// Answer `question` against the document at `path`. The output shape is model dependent.
    async fn answer(&self, path: &Path, question: &str) -> Result<Value, ModelError>;
}
