//! Document pipeline: file classification, text extraction, summarization, and question answering.

pub mod document_qa;
pub mod extract;
mod service;
pub mod summarize;
pub mod tabular;
pub mod types;
pub mod workbook;

pub use service::{DocumentApi, DocumentService};
pub use types::{
    DocumentAnswer, DocumentError, ExtractionError, FileKind, FileReference, ProcessedDocument,
    TabularError,
};

/// Run blocking work on tokio's blocking pool.
///
/// A task that panics or is cancelled surfaces as [`DocumentError::Internal`].
pub(crate) async fn run_blocking<F, T>(task: F) -> Result<T, DocumentError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|error| {
        tracing::error!(error = %error, "Blocking task failed");
        DocumentError::Internal(format!("blocking task failed: {error}"))
    })
}
