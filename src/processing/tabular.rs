//! Keyword search over spreadsheet columns.
//!
//! A question is reduced to lowercase keywords; every column of every sheet is scanned for cells
//! containing any keyword, literally. Matching rows are reported per `(sheet, column)` pair. When
//! nothing matches, the first rows of the first sheet are returned instead.

use crate::processing::{
    run_blocking,
    types::{DocumentError, TabularError},
    workbook::{Frame, Workbook, search_text},
};
use regex::Regex;
use std::path::Path;

/// Keywords must be longer than this many characters.
const MIN_TOKEN_CHARS: usize = 2;
/// Maximum number of `(sheet, column)` blocks included in an answer.
pub const MAX_RESULT_BLOCKS: usize = 3;

const BLOCK_DIVIDER: &str = "\n---\n";

/// Answers free-text questions against spreadsheets by keyword matching.
#[derive(Debug, Default, Clone, Copy)]
pub struct TabularQueryEngine;

impl TabularQueryEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }

    /// Answer `question` against the workbook at `path`.
    ///
    /// A workbook that cannot be opened produces an answer describing the error; only a failure
    /// of the blocking reader task itself is returned as an error.
    pub async fn answer(&self, path: &Path, question: &str) -> Result<String, DocumentError> {
        let owned = path.to_path_buf();
        let answer = match run_blocking(move || Workbook::open(&owned)).await? {
            Ok(workbook) => answer_workbook(&workbook, question),
            Err(error) => unreadable_workbook_answer(path, &error),
        };
        Ok(answer)
    }
}

fn unreadable_workbook_answer(path: &Path, error: &TabularError) -> String {
    tracing::warn!(path = %path.display(), error = %error, "Failed to open workbook for search");
    format!("Error processing Excel: {error}")
}

/// Lowercase whitespace-separated words longer than two characters.
pub fn question_tokens(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Alternation matching any token literally; `None` when there are no tokens.
fn keyword_pattern(tokens: &[String]) -> Option<Regex> {
    if tokens.is_empty() {
        return None;
    }
    let alternation = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&alternation) {
        Ok(pattern) => Some(pattern),
        Err(error) => {
            tracing::warn!(error = %error, "Keyword pattern rejected; falling back to preview");
            None
        }
    }
}

/// Answer `question` against an already loaded workbook.
pub fn answer_workbook(workbook: &Workbook, question: &str) -> String {
    let tokens = question_tokens(question);
    let blocks = match keyword_pattern(&tokens) {
        Some(pattern) => matching_blocks(workbook, &pattern),
        None => Vec::new(),
    };

    tracing::debug!(
        tokens = tokens.len(),
        matches = blocks.len(),
        "Tabular keyword scan finished"
    );

    if !blocks.is_empty() {
        let shown: Vec<&str> = blocks
            .iter()
            .take(MAX_RESULT_BLOCKS)
            .map(String::as_str)
            .collect();
        return format!(
            "Question: {question}\n\nResults:\n{}",
            shown.join(BLOCK_DIVIDER)
        );
    }

    match workbook.sheets.first() {
        Some(sheet) => format!(
            "Question: {question}\n\nNo exact match. Data preview:\n{}",
            sheet.frame().head()
        ),
        None => "Error processing Excel: workbook contains no sheets".to_string(),
    }
}

fn matching_blocks(workbook: &Workbook, pattern: &Regex) -> Vec<String> {
    let mut blocks = Vec::new();
    for sheet in &workbook.sheets {
        let frame = sheet.frame();
        for (column, header) in frame.columns.iter().enumerate() {
            match matching_rows(&frame, column, pattern) {
                Ok(rows) if rows.is_empty() => {}
                Ok(rows) => blocks.push(format!(
                    "Sheet '{}', Column '{}':\n{}",
                    sheet.name,
                    header,
                    frame.render(&rows)
                )),
                Err(error) => skip_unsearchable_column(&sheet.name, &error),
            }
        }
    }
    blocks
}

/// Record indices whose cell in `column` contains a keyword.
fn matching_rows(
    frame: &Frame,
    column: usize,
    pattern: &Regex,
) -> Result<Vec<usize>, TabularError> {
    let mut rows = Vec::new();
    for (index, record) in frame.rows.iter().enumerate() {
        let text = search_text(&record[column]).map_err(|detail| TabularError::CellError {
            column: frame.columns[column].clone(),
            detail,
        })?;
        if pattern.is_match(&text.to_lowercase()) {
            rows.push(index);
        }
    }
    Ok(rows)
}

/// A column that cannot be searched is left out of the answer; the scan continues.
fn skip_unsearchable_column(sheet: &str, error: &TabularError) {
    tracing::debug!(sheet, error = %error, "Skipping column during keyword scan");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::workbook::{
        Sheet,
        tests::{date, people_sheet, staff_fixture, text},
    };
    use calamine::{CellErrorType, Data};

    fn people() -> Workbook {
        Workbook {
            sheets: vec![people_sheet()],
        }
    }

    #[test]
    fn tokens_drop_short_words_and_lowercase() {
        assert_eq!(
            question_tokens("Who is ALICE in HR"),
            vec!["who".to_string(), "alice".to_string()]
        );
        assert!(question_tokens("is it ok").is_empty());
    }

    #[test]
    fn matching_row_is_reported_under_its_column() {
        let answer = answer_workbook(&people(), "alice");
        assert_eq!(
            answer,
            "Question: alice\n\nResults:\nSheet 'People', Column 'Name':\n    Name  Age\n0  Alice   30"
        );
        assert!(!answer.contains("Bob"));
    }

    #[test]
    fn short_tokens_fall_back_to_preview() {
        let answer = answer_workbook(&people(), "is it ok");
        assert!(answer.starts_with("Question: is it ok\n\nNo exact match. Data preview:\n"));
        assert!(answer.contains("Alice"));
        assert!(answer.contains("Bob"));
    }

    #[test]
    fn unmatched_question_previews_first_sheet_only() {
        let workbook = Workbook {
            sheets: vec![
                people_sheet(),
                Sheet::new("Other", vec![vec![text("City")], vec![text("Oslo")]]),
            ],
        };
        let answer = answer_workbook(&workbook, "zebra");
        assert!(answer.contains("No exact match"));
        assert!(!answer.contains("Oslo"));
    }

    #[test]
    fn results_are_capped_at_three_blocks() {
        let header: Vec<Data> = (0..5).map(|i| text(&format!("c{i}"))).collect();
        let row: Vec<Data> = (0..5).map(|_| text("needle")).collect();
        let workbook = Workbook {
            sheets: vec![Sheet::new("Wide", vec![header, row])],
        };

        let answer = answer_workbook(&workbook, "needle");
        assert_eq!(answer.matches("Sheet 'Wide', Column").count(), MAX_RESULT_BLOCKS);
        assert_eq!(answer.matches(BLOCK_DIVIDER).count(), MAX_RESULT_BLOCKS - 1);
        assert!(answer.contains("Column 'c2'"));
        assert!(!answer.contains("Column 'c3'"));
    }

    #[test]
    fn blocks_follow_sheet_then_column_order() {
        let workbook = Workbook {
            sheets: vec![
                Sheet::new("First", vec![vec![text("x")], vec![text("apple pie")]]),
                Sheet::new("Second", vec![vec![text("y")], vec![text("apple")]]),
            ],
        };
        let answer = answer_workbook(&workbook, "apple");
        let first = answer.find("Sheet 'First'").expect("first block");
        let second = answer.find("Sheet 'Second'").expect("second block");
        assert!(first < second);
    }

    #[test]
    fn keywords_match_literally() {
        let workbook = Workbook {
            sheets: vec![Sheet::new(
                "Codes",
                vec![vec![text("code")], vec![text("a+b")], vec![text("aab")]],
            )],
        };
        let answer = answer_workbook(&workbook, "a+b");
        assert!(answer.contains("a+b"));
        assert!(!answer.contains("aab"));
    }

    #[test]
    fn numeric_cells_are_searchable_as_text() {
        let workbook = Workbook {
            sheets: vec![Sheet::new(
                "Sales",
                vec![
                    vec![text("Year"), text("Total")],
                    vec![Data::Float(2024.0), Data::Int(1200)],
                    vec![Data::Float(1999.0), Data::Int(800)],
                ],
            )],
        };
        let answer = answer_workbook(&workbook, "sales in 2024");
        assert!(answer.contains("Column 'Year'"));
        assert!(answer.contains("1200"));
        assert!(!answer.contains("1999"));
    }

    #[test]
    fn unreadable_column_is_skipped_not_fatal() {
        let workbook = Workbook {
            sheets: vec![Sheet::new(
                "Mixed",
                vec![
                    vec![text("ratio"), text("label")],
                    vec![Data::Error(CellErrorType::Div0), text("target")],
                ],
            )],
        };
        let answer = answer_workbook(&workbook, "target");
        assert!(answer.contains("Column 'label'"));
        assert!(!answer.contains("Column 'ratio'"));
    }

    #[test]
    fn date_cells_match_by_calendar_year() {
        let workbook = Workbook {
            sheets: vec![Sheet::new(
                "Invoices",
                vec![
                    vec![text("Number"), text("Issued")],
                    vec![text("INV-7"), date(45292.0)],
                    vec![text("INV-3"), date(44927.0)],
                ],
            )],
        };
        let answer = answer_workbook(&workbook, "invoices 2024");
        assert!(answer.contains("Column 'Issued'"));
        assert!(answer.contains("INV-7"));
        assert!(answer.contains("2024-01-01 00:00:00"));
        assert!(!answer.contains("INV-3"));
    }

    #[tokio::test]
    async fn answers_from_real_workbook_file() {
        let answer = TabularQueryEngine::new()
            .answer(&staff_fixture(), "Who is Alice")
            .await
            .expect("answer");
        assert_eq!(
            answer,
            "Question: Who is Alice\n\nResults:\nSheet 'People', Column 'Name':\n\
             \x20   Name  Age               Joined\n0  Alice   30  2024-01-01 00:00:00"
        );
    }

    #[tokio::test]
    async fn real_workbook_without_match_previews_first_sheet() {
        let answer = TabularQueryEngine::new()
            .answer(&staff_fixture(), "zebra")
            .await
            .expect("answer");
        assert!(answer.starts_with("Question: zebra\n\nNo exact match. Data preview:\n"));
        assert!(answer.contains("Bob   25  2024-03-15 00:00:00"));
        assert!(!answer.contains("North"));
    }

    #[tokio::test]
    async fn unopenable_file_becomes_error_answer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"garbage").expect("write");

        let answer = TabularQueryEngine::new()
            .answer(&path, "anything")
            .await
            .expect("answer");
        assert!(answer.starts_with("Error processing Excel: "));
    }
}
