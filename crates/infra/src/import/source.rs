//! Tabular sources for batch import.
//!
//! A source yields rows of typed cells, the way a spreadsheet does: a cell is
//! text, a number, or blank. Delimited text is classified cell by cell;
//! workbooks keep the cell types they were saved with.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};

use super::ImportError;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    /// Classify a raw delimited field: blank, numeric, or text.
    ///
    /// `NaN` and `inf` spellings stay text.
    pub fn classify(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Text(_) => "text",
            Cell::Number(_) => "number",
            Cell::Blank => "blank",
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

pub type Row = Vec<Cell>;

/// A tabular input: emptiness check plus an ordered stream of rows.
pub trait TabularSource {
    /// Name used in logs (file name, upload name, ...).
    fn name(&self) -> &str;

    /// True when the source carries no content at all.
    fn is_empty(&self) -> bool;

    /// Rows in source order, header included.
    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<Row, ImportError>> + '_>;
}

/// Pre-built rows, e.g. a decoded worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemorySheet {
    name: String,
    rows: Vec<Row>,
}

impl InMemorySheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl TabularSource for InMemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<Row, ImportError>> + '_> {
        Box::new(self.rows.iter().cloned().map(Ok))
    }
}

/// Comma-delimited bytes read as a sheet, one record per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSheet {
    name: String,
    bytes: Vec<u8>,
}

impl CsvSheet {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ImportError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }
}

impl TabularSource for CsvSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<Row, ImportError>> + '_> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(self.bytes.as_slice());

        Box::new(reader.into_records().map(|record| {
            record
                .map(|r| r.iter().map(Cell::classify).collect())
                .map_err(|e| ImportError::Read(e.to_string()))
        }))
    }
}

/// The first worksheet of an `.xlsx`/`.xls`/`.ods` workbook.
///
/// Decoding happens when rows are requested; a corrupt workbook surfaces as a
/// single [`ImportError::Read`]. Rows with no filled cell are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookSheet {
    name: String,
    bytes: Vec<u8>,
}

impl WorkbookSheet {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ImportError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }
}

impl TabularSource for WorkbookSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn rows(&mut self) -> Box<dyn Iterator<Item = Result<Row, ImportError>> + '_> {
        match first_worksheet(&self.bytes) {
            Ok(rows) => Box::new(rows.into_iter()),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

fn first_worksheet(bytes: &[u8]) -> Result<Vec<Result<Row, ImportError>>, ImportError> {
    let read_err = |e: calamine::Error| ImportError::Read(e.to_string());

    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(read_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Read("workbook has no worksheets".to_string()))?
        .map_err(read_err)?;

    // The range starts at the first used cell; pad so column 0 stays column A.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    Ok(range
        .rows()
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(offset, cells)| {
            let sheet_row = first_row as usize + offset + 1;
            std::iter::repeat_n(Ok(Cell::Blank), first_col as usize)
                .chain(cells.iter().map(|c| workbook_cell(sheet_row, c)))
                .collect()
        })
        .collect())
}

fn workbook_cell(sheet_row: usize, data: &Data) -> Result<Cell, ImportError> {
    match data {
        Data::String(s) => Ok(Cell::Text(s.clone())),
        Data::Float(f) => Ok(Cell::Number(*f)),
        Data::Int(i) => Ok(Cell::Number(*i as f64)),
        Data::Empty => Ok(Cell::Blank),
        other => Err(ImportError::Parse {
            row: sheet_row,
            reason: format!("unsupported cell value {other:?}"),
        }),
    }
}
