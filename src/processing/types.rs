//! Core data types and error definitions for the document pipeline.

use crate::models::ModelError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions routed to the spreadsheet backends.
const TABULAR_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Closed classification of input files driving extraction and query routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Spreadsheet workbooks (`.xlsx`, `.xls`).
    Tabular,
    /// PDFs, raster images, and anything else handed to the OCR and DocVQA models.
    DocumentLike,
}

impl FileKind {
    /// Classify a path by its extension, case-insensitively. Total over all inputs.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            Some(ext) if TABULAR_EXTENSIONS.contains(&ext) => Self::Tabular,
            _ => Self::DocumentLike,
        }
    }
}

/// An input file that existed when the request was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    path: PathBuf,
    kind: FileKind,
}

impl FileReference {
    /// Validate that `path` exists and classify it.
    pub fn resolve(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        if !path.exists() {
            return Err(DocumentError::NotFound(path));
        }
        let kind = FileKind::from_path(&path);
        Ok(Self { path, kind })
    }

    /// Path of the file on the host filesystem.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Classification derived from the extension.
    pub fn kind(&self) -> FileKind {
        self.kind
    }
}

/// Result of the `process` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedDocument {
    /// Short synopsis; absent for short text or when summarization failed.
    pub summary: Option<String>,
    /// Full extracted text.
    pub text: String,
}

/// Result of the `ask` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAnswer {
    /// Answer text produced by the tabular search or the DocVQA model.
    pub answer: String,
}

/// Errors raised while turning a file into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// OCR engine failed.
    #[error("Error during OCR: {0}")]
    Ocr(#[from] ModelError),
    /// Workbook could not be opened or read.
    #[error("Error reading Excel file: {0}")]
    Workbook(String),
}

/// Errors raised while scanning spreadsheets.
#[derive(Debug, Error)]
pub enum TabularError {
    /// Workbook could not be opened, or a sheet could not be read.
    #[error("{0}")]
    Workbook(String),
    /// A column held a value that cannot be searched.
    #[error("column '{column}' contains an unreadable cell: {detail}")]
    CellError {
        /// Header of the offending column.
        column: String,
        /// Description of the cell error.
        detail: String,
    },
}

/// Errors surfaced by the document service.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A required request field was missing or empty.
    #[error("{0}")]
    InvalidInput(String),
    /// The referenced file does not exist.
    #[error("File not found")]
    NotFound(PathBuf),
    /// Extraction produced no usable text.
    #[error("Failed to extract text from file")]
    ExtractionFailed,
    /// Extraction backend failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Model runtime failed.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Any other failure.
    #[error("{0}")]
    Internal(String),
}

impl DocumentError {
    /// Whether the error was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::NotFound(_) | Self::ExtractionFailed
        )
    }
}
