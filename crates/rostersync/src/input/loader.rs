//! CSV loader with encoding detection and lossy fallback.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::encoding::{self, EncodingGuess, FALLBACK_ENCODING};
use super::source::{DataTable, SourceMetadata};
use crate::error::{Result, SyncError};

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
    /// Maximum data rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            max_rows: None,
        }
    }
}

/// Loads CSV bytes into a [`DataTable`].
pub struct CsvLoader {
    config: LoaderConfig,
}

impl CsvLoader {
    /// Create a new loader with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a file from disk.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| SyncError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (table, metadata) = self.load_bytes(&contents)?;
        Ok((table, metadata.with_path(path.to_path_buf())))
    }

    /// Load raw bytes (an uploaded file, a request body, ...).
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<(DataTable, SourceMetadata)> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let guess = encoding::detect_encoding(bytes);
        let (text, used_fallback) = decode(&guess, bytes);
        let encoding_name = if used_fallback {
            FALLBACK_ENCODING.name()
        } else {
            guess.name()
        };

        let table = self.parse_text(&text)?;

        tracing::debug!(
            encoding = encoding_name,
            confident = guess.confident,
            rows = table.row_count(),
            columns = table.column_count(),
            "Loaded CSV"
        );

        let metadata = SourceMetadata::new(
            hash,
            bytes.len() as u64,
            encoding_name,
            used_fallback,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse decoded text.
    fn parse_text(&self, text: &str) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(self.config.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| SyncError::Parse(format!("Failed to read header row: {}", e)))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        if headers.is_empty() {
            return Err(SyncError::Parse("No rows found in input".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record =
                result.map_err(|e| SyncError::Parse(format!("Row {}: {}", row_idx + 1, e)))?;

            if record.len() > expected_cols {
                return Err(SyncError::Parse(format!(
                    "Row {} has {} fields but the header has {}",
                    row_idx + 1,
                    record.len(),
                    expected_cols
                )));
            }

            let mut row: Vec<Option<String>> = record.iter().map(DataTable::cell).collect();

            // Short rows are padded with missing cells
            row.resize(expected_cols, None);

            rows.push(row);
        }

        Ok(DataTable::new(headers, rows))
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode with the guessed encoding, falling back to lossy UTF-8.
fn decode<'a>(guess: &EncodingGuess, bytes: &'a [u8]) -> (Cow<'a, str>, bool) {
    match encoding::decode_strict(guess, bytes) {
        Some(text) => (text, false),
        None => {
            tracing::warn!(
                encoding = guess.name(),
                "Input is not valid for the detected encoding, decoding as UTF-8 with replacement"
            );
            (encoding::decode_lossy(bytes), true)
        }
    }
}
