//! Single-worksheet spreadsheet store.
//!
//! A worksheet is read fully into memory as a header row plus data rows, mutated in place and
//! written back as `.xlsx` to the same path once processing is finished.

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use std::fmt;
use std::path::Path;

use crate::utils;
use crate::FetcherError;

pub mod sample;

/// Excel rejects cells longer than this many characters
pub const MAX_CELL_CHARS: usize = 32_767;

/// In-memory value of one spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel date serial (days since 1899-12-30, fraction is the time of day)
    DateTime(f64),
    /// Excel duration in days
    Duration(f64),
}

impl Cell {
    /// Text content, if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(number) => write!(f, "{}", number),
            Cell::Bool(value) => write!(f, "{}", value),
            Cell::DateTime(serial) | Cell::Duration(serial) => write!(f, "{}", serial),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(text) => Cell::Text(text.clone()),
            Data::Int(number) => Cell::Number(*number as f64),
            Data::Float(number) => Cell::Number(*number),
            Data::Bool(value) => Cell::Bool(*value),
            Data::DateTime(value) if value.is_duration() => Cell::Duration(value.as_f64()),
            Data::DateTime(value) => Cell::DateTime(value.as_f64()),
            // ISO dates, durations and error cells keep their rendered form
            other => Cell::Text(other.to_string()),
        }
    }
}

/// One worksheet: a header row and the data rows beneath it
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    /// Zero-based (row, column) of the header row's first cell
    origin: (u32, u16),
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Build a sheet, padding every row to the header width
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, Cell::Empty);
                }
                row
            })
            .collect();

        Self {
            name: name.into(),
            origin: (0, 0),
            headers,
            rows,
        }
    }

    /// Place the header row at a (row, column) other than A1
    pub fn with_origin(mut self, row: u32, column: u16) -> Self {
        self.origin = (row, column);
        self
    }

    pub fn origin(&self) -> (u32, u16) {
        self.origin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Index of a column that must be present
    pub fn require_column(&self, name: &str) -> Result<usize, FetcherError> {
        self.column(name)
            .ok_or_else(|| FetcherError::MissingColumn(name.to_string()))
    }

    /// Index of a column, appending an empty one if it does not exist yet
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column(name) {
            return index;
        }

        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Empty);
        }
        self.headers.len() - 1
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&Cell::Empty)
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: Cell) {
        if let Some(cells) = self.rows.get_mut(row) {
            if column >= cells.len() {
                cells.resize(column + 1, Cell::Empty);
            }
            cells[column] = value;
        }
    }
}

/// Read one worksheet fully into memory
pub fn load_sheet(path: &Path, sheet_name: &str) -> Result<Sheet> {
    if !path.exists() {
        return Err(FetcherError::WorkbookNotFound(path.display().to_string()).into());
    }
    utils::check_file_accessible(path)?;

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet_name) {
        return Err(FetcherError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available: sheet_names.join(", "),
        }
        .into());
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| FetcherError::EmptySheet(sheet_name.to_string()))?
        .iter()
        .map(|data| Cell::from(data).to_string())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();

    let (origin_row, origin_col) = range.start().unwrap_or((0, 0));
    let origin_col = u16::try_from(origin_col)
        .with_context(|| format!("Worksheet '{}' starts past the last column", sheet_name))?;

    let sheet = Sheet::new(sheet_name, headers, rows).with_origin(origin_row, origin_col);
    tracing::debug!(
        "Loaded {} rows and {} columns from '{}'",
        sheet.len(),
        sheet.headers().len(),
        sheet.name()
    );

    Ok(sheet)
}

/// Write the sheet as a single-worksheet `.xlsx` file, replacing whatever is at `path`
pub fn save_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet.name())
        .with_context(|| format!("Invalid worksheet name '{}'", sheet.name()))?;

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let duration_format = Format::new().set_num_format("[h]:mm:ss");

    let (origin_row, origin_col) = sheet.origin();
    for (col, header) in sheet.headers().iter().enumerate() {
        worksheet.write_string(origin_row, origin_col + col as u16, header.as_str())?;
    }

    for (index, row) in sheet.rows().iter().enumerate() {
        let row_num = origin_row + (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = origin_col + col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    let text = if text.chars().count() > MAX_CELL_CHARS {
                        tracing::warn!(
                            "Row {}: text truncated to the {} character cell limit",
                            index + 1,
                            MAX_CELL_CHARS
                        );
                        utils::truncate_chars(text, MAX_CELL_CHARS)
                    } else {
                        text.as_str()
                    };
                    worksheet.write_string(row_num, col, text)?;
                }
                Cell::Number(number) => {
                    worksheet.write_number(row_num, col, *number)?;
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row_num, col, *value)?;
                }
                Cell::DateTime(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(row_num, col, *serial, format)?;
                }
                Cell::Duration(days) => {
                    worksheet.write_number_with_format(row_num, col, *days, &duration_format)?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write spreadsheet {}", path.display()))?;

    Ok(())
}
