//! Question answering over unstructured documents via the DocVQA model.

use crate::models::{ModelError, ModelRegistry};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Thin call-through to the document QA model.
pub struct DocumentQueryEngine {
    models: Arc<ModelRegistry>,
}

impl DocumentQueryEngine {
    /// Create an engine drawing its model from `models`.
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Self { models }
    }

    /// Ask the model `question` about the file at `path` and return its top answer.
    pub async fn answer(&self, path: &Path, question: &str) -> Result<String, ModelError> {
        let model = self.models.document_qa().await?;
        let output = model.answer(path, question).await?;
        top_answer(&output)
    }
}

/// Pick the `answer` field from a list-of-maps or a single map.
///
/// A `null` answer becomes an empty string.
pub fn top_answer(output: &Value) -> Result<String, ModelError> {
    let best = match output {
        Value::Array(candidates) => candidates.first(),
        other => Some(other),
    };
    match best.and_then(|candidate| candidate.get("answer")) {
        Some(Value::String(answer)) => Ok(answer.clone()),
        Some(Value::Null) => Ok(String::new()),
        Some(other) => Ok(other.to_string()),
        None => Err(ModelError::InvalidResponse(format!(
            "document QA result has no answer: {output}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_first_candidate_from_list() {
        let output = json!([
            { "answer": "$1,200", "score": 0.93 },
            { "answer": "$120", "score": 0.02 }
        ]);
        assert_eq!(top_answer(&output).expect("answer"), "$1,200");
    }

    #[test]
    fn accepts_single_map() {
        let output = json!({ "answer": "ACME Corp" });
        assert_eq!(top_answer(&output).expect("answer"), "ACME Corp");
    }

    #[test]
    fn null_answer_is_empty_not_literal_null() {
        assert_eq!(top_answer(&json!({ "answer": null })).expect("answer"), "");
        assert_eq!(top_answer(&json!([{ "answer": null, "score": 0.0 }])).expect("answer"), "");
    }

    #[test]
    fn rejects_output_without_answer() {
        assert!(top_answer(&json!([])).is_err());
        assert!(top_answer(&json!({ "label": "x" })).is_err());
        assert!(top_answer(&Value::Null).is_err());
    }
}
