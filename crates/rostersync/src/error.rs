//! Error types for the rostersync library.

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SyncResult;

/// Main error type for rostersync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input bytes could not be turned into a tabular dataset.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The field mapping or a component configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The roster source could not be read.
    #[error("Roster error: {0}")]
    Roster(String),

    /// The identity store could not be reached at all; the batch was aborted.
    ///
    /// `partial` holds what was applied before the abort, including a
    /// failure record for the operation that hit the outage.
    #[error("Identity store unavailable: {reason}")]
    StoreUnavailable {
        reason: String,
        partial: Option<Box<SyncResult>>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Short machine-readable kind, used by outer surfaces to tell
    /// input failures apart from store failures.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Io { .. } => "io_error",
            SyncError::Parse(_) | SyncError::Csv(_) => "parse_error",
            SyncError::Configuration(_) => "configuration_error",
            SyncError::Roster(_) => "roster_error",
            SyncError::StoreUnavailable { .. } => "store_unavailable",
            SyncError::Json(_) => "json_error",
        }
    }

    /// Operations applied before a store outage aborted the sync.
    pub fn partial_result(&self) -> Option<&SyncResult> {
        match self {
            SyncError::StoreUnavailable { partial, .. } => partial.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for rostersync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
