//! Workbook access. Every read of the DTP reference workbook goes through here.
//!
//! Sheets carry a title above the header, so the header row is configurable
//! (zero-based, default 1). Column names are trimmed and blank cells read as "".

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use thiserror::Error;
use tracing::{debug, info};

pub mod reference;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Workbook file not found: '{0}'")]
    FileNotFound(PathBuf),

    #[error("Unable to open workbook '{path}': {message}")]
    Open { path: PathBuf, message: String },

    #[error("Sheet '{sheet}' not found. Available sheets: {}", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Unable to read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },

    #[error("Sheet '{sheet}' has no header on row {row}")]
    HeaderNotFound { sheet: String, row: usize },

    #[error("Sheet '{sheet}' is missing columns {missing:?}. Available columns: {available:?}")]
    MissingColumns {
        sheet: String,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Sheet '{0}' contains no data rows")]
    EmptySheet(String),
}

/// A sheet read into memory as trimmed header names plus string rows.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub name: String,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let mut rows: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();
        align_row_lengths(&mut headers, &mut rows);

        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if !header.is_empty() {
                // first occurrence wins on duplicate column names
                index.entry(header.clone()).or_insert(i);
            }
        }

        Self {
            name: name.to_string(),
            headers,
            index,
            rows,
        }
    }

    /// Builds a table from a calamine range. `header_row` is an absolute,
    /// zero-based sheet row; rows above it are ignored.
    pub fn from_range(name: &str, range: &Range<Data>, header_row: usize) -> Result<Self, WorkbookError> {
        // Ranges start at the first non-empty cell, not necessarily at A1.
        let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (offset, row) in range.rows().enumerate() {
            let absolute = start_row + offset;
            if absolute < header_row {
                continue;
            }
            let values: Vec<String> = row.iter().map(cell_to_string).collect();
            if absolute == header_row {
                headers = Some(values);
            } else {
                rows.push(values);
            }
        }

        let headers = headers
            .filter(|h| h.iter().any(|c| !c.is_empty()))
            .ok_or_else(|| WorkbookError::HeaderNotFound {
                sheet: name.to_string(),
                row: header_row,
            })?;

        Ok(Self::new(name, headers, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Fails with the list of missing and available columns when any is absent.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), WorkbookError> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(WorkbookError::MissingColumns {
            sheet: self.name.clone(),
            missing,
            available: self.headers.iter().filter(|h| !h.is_empty()).cloned().collect(),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record { table: self, row })
    }
}

/// One data row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a SheetTable,
    row: &'a [String],
}

impl<'a> Record<'a> {
    /// `None` when the column does not exist; `Some("")` for a blank cell.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let i = *self.table.index.get(column)?;
        self.row.get(i).map(String::as_str)
    }

    /// Cell value, or `default` when the column does not exist.
    pub fn get_or(&self, column: &str, default: &str) -> String {
        self.get(column).unwrap_or(default).to_string()
    }
}

/// Reads one sheet from the workbook at `path`.
pub fn load_sheet(path: &Path, sheet: &str, header_row: usize) -> Result<SheetTable, WorkbookError> {
    if !path.exists() {
        return Err(WorkbookError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| WorkbookError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let available = workbook.sheet_names();
    debug!("Workbook {:?} sheets: {:?}", path, available);
    if !available.iter().any(|s| s == sheet) {
        return Err(WorkbookError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| WorkbookError::Read {
            sheet: sheet.to_string(),
            message: e.to_string(),
        })?;

    let table = SheetTable::from_range(sheet, &range, header_row)?;
    info!("Sheet '{}' loaded ({} rows)", sheet, table.len());
    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string().trim().to_string(),
    }
}

fn align_row_lengths(headers: &mut Vec<String>, rows: &mut [Vec<String>]) {
    let column_count = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    headers.resize(column_count, String::new());
    for row in rows.iter_mut() {
        row.resize(column_count, String::new());
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    use rust_xlsxwriter::Workbook;

    /// Writes a workbook where each sheet has a title on row 0, headers on
    /// row 1 and data from row 2.
    pub fn write_workbook(path: &Path, sheets: &[(&str, &[&str], &[&[&str]])]) {
        let mut workbook = Workbook::new();
        for (name, headers, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*name).unwrap();
            worksheet.write_string(0, 0, "Digital Talent Pool").unwrap();
            for (col, header) in headers.iter().enumerate() {
                worksheet.write_string(1, col as u16, *header).unwrap();
            }
            for (r, row) in rows.iter().enumerate() {
                for (col, value) in row.iter().enumerate() {
                    if !value.is_empty() {
                        worksheet
                            .write_string(r as u32 + 2, col as u16, *value)
                            .unwrap();
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }
}
