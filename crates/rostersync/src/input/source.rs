//! Tabular dataset and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the loaded bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path, if the bytes came from a named file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Full path to the file, if loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    /// Input size in bytes.
    pub size_bytes: u64,
    /// Encoding used to decode the bytes.
    pub encoding: String,
    /// Whether the lossy UTF-8 fallback had to be used.
    pub used_fallback: bool,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the bytes were loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for bytes that have been loaded.
    pub fn new(
        hash: String,
        size_bytes: u64,
        encoding: impl Into<String>,
        used_fallback: bool,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            file: None,
            path: None,
            hash,
            size_bytes,
            encoding: encoding.into(),
            used_fallback,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }

    /// Attach the originating path.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned());
        self.path = Some(path);
        self
    }

    /// Attach a file name without a path (e.g. an upload).
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file = Some(name.into());
        self
    }
}

/// Parsed tabular data.
///
/// Every row holds exactly `headers.len()` cells. A cell is `None` when the
/// field was empty in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    /// Column headers, in file order. Not necessarily unique.
    pub headers: Vec<String>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<Option<String>>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from plain string cells, treating empty strings as missing.
    pub fn from_strings<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Self {
        let headers = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| Self::cell(cell.as_ref())).collect())
            .collect();
        Self { headers, rows }
    }

    /// Convert a raw field into a cell value.
    pub fn cell(raw: &str) -> Option<String> {
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all cells for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }

    /// Get the non-missing values of a column, in row order.
    pub fn present_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.column_values(index).flatten()
    }

    /// Get a specific cell value. `None` for missing cells and out-of-range
    /// coordinates alike.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}
