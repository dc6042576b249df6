//! Document service routing extraction, summarization, and question answering by file kind.

use crate::{
    config::Config,
    metrics::{MetricsSnapshot, ServiceMetrics},
    models::ModelRegistry,
    processing::{
        document_qa::DocumentQueryEngine,
        extract::{TextExtractor, is_placeholder},
        summarize::Summarizer,
        tabular::TabularQueryEngine,
        types::{DocumentAnswer, DocumentError, FileKind, FileReference, ProcessedDocument},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Entry points exposed to request-handling surfaces (HTTP, CLI).
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Extract the text of a file and summarize it when it is long enough.
    async fn process_document(&self, file_path: &str) -> Result<ProcessedDocument, DocumentError>;

    /// Answer a question about a file.
    async fn ask_document(
        &self,
        question: &str,
        file_path: Option<&str>,
    ) -> Result<DocumentAnswer, DocumentError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Dispatches each request to the backend matching the file's [`FileKind`].
///
/// The service is stateless between calls apart from the shared model registry and counters.
/// Construct it once near process start and share it through an `Arc`.
pub struct DocumentService {
    extractor: TextExtractor,
    summarizer: Summarizer,
    tabular: TabularQueryEngine,
    document_qa: DocumentQueryEngine,
    metrics: Arc<ServiceMetrics>,
}

impl DocumentService {
    /// Build a service whose backends share `models`.
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Self {
            extractor: TextExtractor::new(models.clone()),
            summarizer: Summarizer::new(models.clone()),
            tabular: TabularQueryEngine::new(),
            document_qa: DocumentQueryEngine::new(models),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Build a service backed by the inference runtime described by `config`.
    pub fn from_config(config: &Config) -> Self {
        tracing::info!(inference_url = %config.inference_url, "Initializing document service");
        Self::new(Arc::new(ModelRegistry::from_config(config)))
    }

    /// Extract text from the file and attach a summary for texts over the length threshold.
    pub async fn process_document(
        &self,
        file_path: &str,
    ) -> Result<ProcessedDocument, DocumentError> {
        let file = FileReference::resolve(file_path)?;
        tracing::info!(path = file_path, kind = ?file.kind(), "Processing document");

        let text = self.extractor.extract(&file).await?;
        if text.trim().is_empty() || is_placeholder(&text) {
            tracing::info!(path = file_path, "No text extracted");
            return Err(DocumentError::ExtractionFailed);
        }

        let summary = if Summarizer::should_summarize(&text) {
            self.summarizer.summarize(&text).await
        } else {
            None
        };

        self.metrics.record_document(summary.is_some());
        tracing::info!(
            path = file_path,
            chars = text.chars().count(),
            summarized = summary.is_some(),
            "Document processed"
        );
        Ok(ProcessedDocument { summary, text })
    }

    /// Answer `question` about the file at `file_path`.
    pub async fn ask_document(
        &self,
        question: &str,
        file_path: Option<&str>,
    ) -> Result<DocumentAnswer, DocumentError> {
        if question.trim().is_empty() {
            return Err(DocumentError::InvalidInput("question is required".into()));
        }
        let file_path = file_path
            .filter(|path| !path.is_empty())
            .ok_or_else(|| DocumentError::InvalidInput("file_path is required".into()))?;
        let file = FileReference::resolve(file_path).map_err(|error| match error {
            DocumentError::NotFound(_) => DocumentError::InvalidInput("File not found".into()),
            other => other,
        })?;
        tracing::info!(path = file_path, kind = ?file.kind(), "Answering question");

        let answer = match file.kind() {
            FileKind::Tabular => self.tabular.answer(file.path(), question).await?,
            FileKind::DocumentLike => self.document_qa.answer(file.path(), question).await?,
        };

        self.metrics.record_question();
        Ok(DocumentAnswer { answer })
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn process_document(&self, file_path: &str) -> Result<ProcessedDocument, DocumentError> {
        DocumentService::process_document(self, file_path).await
    }

    async fn ask_document(
        &self,
        question: &str,
        file_path: Option<&str>,
    ) -> Result<DocumentAnswer, DocumentError> {
        DocumentService::ask_document(self, question, file_path).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
