//! Spreadsheet loading and plain-text table rendering.
//!
//! Workbooks are read eagerly into memory with `calamine`, so the scanning and extraction code
//! works on plain vectors and can be exercised without files on disk.

use crate::processing::types::TabularError;
use calamine::{Data, DataType, Reader, open_workbook_auto};
use std::path::Path;

/// Rows shown by the data preview.
pub(crate) const PREVIEW_ROWS: usize = 5;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A workbook loaded into memory, sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// Sheets in workbook order.
    pub sheets: Vec<Sheet>,
}

/// A single worksheet: its name and raw cell rows, header row included.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Used range of the sheet, row by row.
    pub rows: Vec<Vec<Data>>,
}

impl Workbook {
    /// Open an `.xlsx` or `.xls` file and read every sheet.
    pub fn open(path: &Path) -> Result<Self, TabularError> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|error| TabularError::Workbook(error.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|error| {
                TabularError::Workbook(format!("failed to read sheet '{name}': {error}"))
            })?;
            let rows = range.rows().map(<[Data]>::to_vec).collect();
            sheets.push(Sheet { name, rows });
        }

        tracing::debug!(path = %path.display(), sheets = sheets.len(), "Loaded workbook");
        Ok(Self { sheets })
    }
}

impl Sheet {
    /// Create a sheet from raw rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Interpret the first row as column headers and the remaining rows as records.
    pub fn frame(&self) -> Frame {
        let Some((header, records)) = self.rows.split_first() else {
            return Frame::default();
        };

        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width)
            .map(|index| match header.get(index) {
                Some(Data::Empty) | None => format!("Unnamed: {index}"),
                Some(cell) => cell_text(cell),
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                record.resize(width, Data::Empty);
                record
            })
            .collect();

        Frame { columns, rows }
    }
}

/// Header-labelled view of a sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Column headers in column order.
    pub columns: Vec<String>,
    /// Records, each padded to the number of columns.
    pub rows: Vec<Vec<Data>>,
}

impl Frame {
    /// Render the rows at `indices` as an aligned text table labelled with their record index.
    pub fn render(&self, indices: &[usize]) -> String {
        if indices.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.columns.join(", ")
            );
        }

        let labels: Vec<String> = indices.iter().map(usize::to_string).collect();
        let cells: Vec<Vec<String>> = indices
            .iter()
            .map(|&index| self.rows[index].iter().map(display_cell).collect())
            .collect();

        let label_width = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(column, header)| {
                cells
                    .iter()
                    .map(|row| row[column].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = " ".repeat(label_width);
        for (header, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {header:>width$}"));
        }
        for (label, row) in labels.iter().zip(&cells) {
            out.push('\n');
            out.push_str(&format!("{label:<label_width$}"));
            for (value, width) in row.iter().zip(&widths) {
                out.push_str(&format!("  {value:>width$}"));
            }
        }
        out
    }

    /// Render the first [`PREVIEW_ROWS`] records.
    pub fn head(&self) -> String {
        let count = self.rows.len().min(PREVIEW_ROWS);
        let indices: Vec<usize> = (0..count).collect();
        self.render(&indices)
    }
}

/// Text form of a cell shared by extraction, search, and rendering.
///
/// Date cells print as `YYYY-MM-DD HH:MM:SS` rather than their serial number; durations and
/// everything else use calamine's own formatting. Empty cells are blank.
pub fn cell_text(cell: &Data) -> String {
    let is_datetime = match cell {
        Data::DateTime(value) => !value.is_duration(),
        Data::DateTimeIso(_) => true,
        _ => false,
    };
    if is_datetime {
        if let Some(datetime) = cell.as_datetime() {
            return datetime.format(DATETIME_FORMAT).to_string();
        }
    }
    cell.to_string()
}

/// Text form of a cell used when searching.
pub(crate) fn search_text(cell: &Data) -> Result<String, String> {
    match cell {
        Data::Error(error) => Err(error.to_string()),
        other => Ok(cell_text(other)),
    }
}

fn display_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => "NaN".to_string(),
        other => cell_text(other),
    }
}
