//! Process-wide model registry with initialize-once semantics.

use super::{
    DocumentQaModel, ModelError, OcrEngine, SummarizationModel,
    http::{HttpDocumentQaModel, HttpOcrEngine, HttpSummarizationModel, InferenceEndpoint},
};
use crate::config::Config;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Builds model backends on first use.
pub trait ModelFactory: Send + Sync {
    /// Construct the OCR engine.
    fn ocr(&self) -> Result<Arc<dyn OcrEngine>, ModelError>;
    /// Construct the summarization model.
    fn summarizer(&self) -> Result<Arc<dyn SummarizationModel>, ModelError>;
    /// Construct the document QA model.
    fn document_qa(&self) -> Result<Arc<dyn DocumentQaModel>, ModelError>;
}

/// Factory producing clients for the configured inference runtime.
pub struct HttpModelFactory {
    config: Config,
}

impl HttpModelFactory {
    /// Create a factory for the runtime described by `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn endpoint(&self, model: &str) -> Result<InferenceEndpoint, ModelError> {
        InferenceEndpoint::new(
            self.config.inference_url.clone(),
            model,
            self.config.inference_timeout(),
        )
    }
}

impl ModelFactory for HttpModelFactory {
    fn ocr(&self) -> Result<Arc<dyn OcrEngine>, ModelError> {
        let endpoint = self.endpoint(&self.config.ocr_model)?;
        Ok(Arc::new(HttpOcrEngine::new(endpoint)))
    }

    fn summarizer(&self) -> Result<Arc<dyn SummarizationModel>, ModelError> {
        let endpoint = self.endpoint(&self.config.summarization_model)?;
        Ok(Arc::new(HttpSummarizationModel::new(endpoint)))
    }

    fn document_qa(&self) -> Result<Arc<dyn DocumentQaModel>, ModelError> {
        let endpoint = self.endpoint(&self.config.document_qa_model)?;
        Ok(Arc::new(HttpDocumentQaModel::new(endpoint)))
    }
}

/// Lazily constructed model instances shared by every request.
///
/// Each accessor is single-flight: concurrent first callers wait on the same initialization and
/// observe the same instance. A failed construction leaves the slot empty so a later request
/// retries it.
pub struct ModelRegistry {
    factory: Arc<dyn ModelFactory>,
    ocr: OnceCell<Arc<dyn OcrEngine>>,
    summarizer: OnceCell<Arc<dyn SummarizationModel>>,
    document_qa: OnceCell<Arc<dyn DocumentQaModel>>,
}

impl ModelRegistry {
    /// Create an empty registry backed by `factory`.
    pub fn new(factory: Arc<dyn ModelFactory>) -> Self {
        Self {
            factory,
            ocr: OnceCell::new(),
            summarizer: OnceCell::new(),
            document_qa: OnceCell::new(),
        }
    }

    /// Create a registry for the inference runtime described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(HttpModelFactory::new(config.clone())))
    }

    /// Get the OCR engine, constructing it on first use.
    pub async fn ocr(&self) -> Result<Arc<dyn OcrEngine>, ModelError> {
        self.ocr
            .get_or_try_init(|| async {
                tracing::info!("Initializing OCR engine");
                self.factory.ocr()
            })
            .await
            .map(Arc::clone)
    }

    /// Get the summarization model, constructing it on first use.
    pub async fn summarizer(&self) -> Result<Arc<dyn SummarizationModel>, ModelError> {
        self.summarizer
            .get_or_try_init(|| async {
                tracing::info!("Initializing summarization model");
                self.factory.summarizer()
            })
            .await
            .map(Arc::clone)
    }

    /// Get the document QA model, constructing it on first use.
    pub async fn document_qa(&self) -> Result<Arc<dyn DocumentQaModel>, ModelError> {
        self.document_qa
            .get_or_try_init(|| async {
                tracing::info!("Initializing document QA model");
                self.factory.document_qa()
            })
            .await
            .map(Arc::clone)
    }
}
