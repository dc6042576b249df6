//! Best-effort abstractive summaries for extracted text.

use crate::models::{ModelError, ModelRegistry, SummarizationRequest};
use serde_json::Value;
use std::sync::Arc;

/// Texts at or below this many characters are returned without a summary.
pub const SUMMARY_MIN_CHARS: usize = 200;
/// Input passed to the model is cut to this many characters.
pub const SUMMARY_INPUT_CHARS: usize = 3000;
/// Upper bound on generated summary tokens.
pub const SUMMARY_MAX_TOKENS: usize = 150;
/// Lower bound on generated summary tokens.
pub const SUMMARY_MIN_TOKENS: usize = 30;

/// Field carrying the summary in structured model output.
const SUMMARY_FIELD: &str = "summary_text";

/// Wraps the summarization model with truncation and output normalization.
pub struct Summarizer {
    models: Arc<ModelRegistry>,
}

impl Summarizer {
    /// Create a summarizer drawing its model from `models`.
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Self { models }
    }

    /// Whether `text` is long enough to warrant a summary.
    pub fn should_summarize(text: &str) -> bool {
        text.chars().count() > SUMMARY_MIN_CHARS
    }

    /// Summarize `text`, returning `None` if the model fails or returns nothing usable.
    ///
    /// Failures are logged and absorbed; a missing summary never fails the request.
    pub async fn summarize(&self, text: &str) -> Option<String> {
        match self.try_summarize(text).await {
            Ok(summary) => summary,
            Err(error) => {
                tracing::warn!(error = %error, "Summarization failed; continuing without summary");
                None
            }
        }
    }

    async fn try_summarize(&self, text: &str) -> Result<Option<String>, ModelError> {
        let model = self.models.summarizer().await?;
        let request = SummarizationRequest {
            text: truncate_chars(text, SUMMARY_INPUT_CHARS).to_string(),
            max_length: SUMMARY_MAX_TOKENS,
            min_length: SUMMARY_MIN_TOKENS,
            do_sample: false,
        };
        let output = model.summarize(request).await?;
        Ok(normalize_summary(&output))
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Reduce a model result to a single string.
///
/// Lists contribute their first element. Objects exposing `summary_text` yield that field;
/// anything else is rendered as text. Empty lists and `null` yield `None`.
pub fn normalize_summary(output: &Value) -> Option<String> {
    let first = match output {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match first {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => match fields.get(SUMMARY_FIELD) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(first.to_string()),
        },
        other => Some(other.to_string()),
    }
}
