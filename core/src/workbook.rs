//! Spreadsheet access
//!
//! Wraps calamine so the rest of the crate only ever sees a [`SheetGrid`]:
//! a rectangular-ish table of trimmed strings. Both the report export and the
//! investigation levels workbook go through here.

use crate::error::{OverxrptError, Result};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// An open workbook (xlsx, xlsm, xls or ods)
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Opens a workbook, detecting the format from the file extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let sheets = open_workbook_auto(&path).map_err(|e| {
            OverxrptError::Workbook(format!("failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { path, sheets })
    }

    /// Path the workbook was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Reads one worksheet into a grid of strings
    pub fn grid(&mut self, name: &str) -> Result<SheetGrid> {
        let range = self.sheets.worksheet_range(name)?;
        // Ranges start at the first used cell, not at A1
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];
        rows.extend(range.rows().map(|row| {
            std::iter::repeat(String::new())
                .take(first_col as usize)
                .chain(row.iter().map(cell_text))
                .collect()
        }));
        Ok(SheetGrid::new(name, rows))
    }

    /// Reads the first worksheet
    pub fn first_grid(&mut self) -> Result<SheetGrid> {
        let name = self.sheet_names().into_iter().next().ok_or_else(|| {
            OverxrptError::MalformedInput(format!(
                "{} contains no worksheets",
                self.path.display()
            ))
        })?;
        self.grid(&name)
    }
}

/// Converts a cell to trimmed text
///
/// Dates become `YYYY-MM-DD`, whole floats lose their fractional part
/// (so account codes stored as numbers read back as typed).
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.chars().take(10).collect(),
        other => other.to_string(),
    }
}

/// A worksheet as rows of strings
///
/// Cells outside the stored rows read as empty strings, so callers can index
/// freely without checking row lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    /// Creates a grid from owned rows
    pub fn new(name: &str, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    /// Creates a grid from string slices
    ///
    /// # Example
    ///
    /// ```
    /// use overxrpt_core::SheetGrid;
    ///
    /// let grid = SheetGrid::from_rows("levels", &[&["Code", "Name"], &["ABC123", "Site"]]);
    /// assert_eq!(grid.cell(1, 0), "ABC123");
    /// assert_eq!(grid.cell(5, 5), "");
    /// ```
    pub fn from_rows(name: &str, rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell text, empty when out of bounds
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Row cells, empty when out of bounds
    pub fn row(&self, row: usize) -> &[String] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}
