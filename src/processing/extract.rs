//! Text extraction backends: OCR for document-like files and cell walking for workbooks.

use crate::models::{ModelRegistry, OcrLine};
use crate::processing::{
    run_blocking,
    types::{DocumentError, ExtractionError, FileKind, FileReference},
    workbook::{Workbook, cell_text},
};
use calamine::Data;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Returned when the OCR engine detects no regions at all.
pub const NO_TEXT_DETECTED: &str = "No text detected in the document.";
/// Returned when regions were detected but none carried any text.
pub const NO_TEXT_EXTRACTED: &str = "No text extracted.";

/// Whether `text` is one of the placeholders returned instead of empty output.
pub fn is_placeholder(text: &str) -> bool {
    text == NO_TEXT_DETECTED || text == NO_TEXT_EXTRACTED
}

/// Converts files into a single text blob according to their [`FileKind`].
pub struct TextExtractor {
    models: Arc<ModelRegistry>,
}

impl TextExtractor {
    /// Create an extractor drawing its OCR engine from `models`.
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Self { models }
    }

    /// Extract all text from `file`. Never returns an empty string on success.
    pub async fn extract(&self, file: &FileReference) -> Result<String, DocumentError> {
        match file.kind() {
            FileKind::Tabular => extract_workbook(file.path().to_path_buf()).await,
            FileKind::DocumentLike => Ok(self.extract_ocr(file.path()).await?),
        }
    }

    async fn extract_ocr(&self, path: &Path) -> Result<String, ExtractionError> {
        let engine = self.models.ocr().await?;
        let lines = engine.recognize(path).await?;
        let text = ocr_text(&lines);
        tracing::debug!(
            path = %path.display(),
            lines = lines.len(),
            chars = text.chars().count(),
            "OCR extraction finished"
        );
        Ok(text)
    }
}

async fn extract_workbook(path: PathBuf) -> Result<String, DocumentError> {
    let workbook = run_blocking(move || Workbook::open(&path))
        .await?
        .map_err(|error| ExtractionError::Workbook(error.to_string()))?;
    let text = workbook_text(&workbook);
    if text.is_empty() {
        return Ok(NO_TEXT_EXTRACTED.to_string());
    }
    Ok(text)
}

/// Join OCR output: regions space-separated within a line, one line per row of output.
pub fn ocr_text(lines: &[OcrLine]) -> String {
    let detected = lines.iter().flatten().any(|regions| !regions.is_empty());
    if !detected {
        return NO_TEXT_DETECTED.to_string();
    }

    let mut text = String::new();
    for regions in lines.iter().flatten() {
        let line: Vec<&str> = regions.iter().map(|region| region.text()).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        NO_TEXT_EXTRACTED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Flatten a workbook into text: a `Sheet: <name>` header per sheet, one line per row with
/// non-empty cells space-joined, and a blank line between sheets.
pub fn workbook_text(workbook: &Workbook) -> String {
    let mut text = String::new();
    for sheet in &workbook.sheets {
        text.push_str(&format!("Sheet: {}\n", sheet.name));
        for row in &sheet.rows {
            let cells: Vec<String> = row
                .iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(cell_text)
                .collect();
            text.push_str(&cells.join(" "));
            text.push('\n');
        }
        text.push('\n');
    }
    text.trim().to_string()
}
