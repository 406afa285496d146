//! Main RosterSync struct and public API.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inference::{FieldDetector, InferenceConfig, ScoredColumn};
use crate::input::{CsvLoader, DataTable, LoaderConfig, SourceMetadata};
use crate::mapping::FieldMapping;
use crate::preview::{DEFAULT_PREVIEW_ROWS, extract_preview};
use crate::reconcile::{ChangeSet, DEFAULT_CHANGE_PREVIEW_LIMIT, Reconciler, SyncPreview};
use crate::roster::Roster;
use crate::store::IdentityStore;
use crate::sync::{SyncExecutor, SyncResult};

/// Configuration for the sync pipeline.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// CSV loader configuration.
    pub loader: LoaderConfig,
    /// Field inference configuration.
    pub inference: InferenceConfig,
    /// Rows included in an upload preview.
    pub preview_rows: usize,
    /// Entries kept per list in a change set preview.
    pub change_preview_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            inference: InferenceConfig::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            change_preview_limit: DEFAULT_CHANGE_PREVIEW_LIMIT,
        }
    }
}

/// What an uploaded CSV looks like: its shape, first rows and the
/// suggested field mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAnalysis {
    pub headers: Vec<String>,
    /// First rows; missing cells are empty strings.
    pub preview: Vec<Vec<String>>,
    pub auto_mapping: FieldMapping,
    pub total_rows: usize,
    /// Per-column inference scores.
    pub columns: Vec<ScoredColumn>,
    pub source: SourceMetadata,
}

/// The roster sync pipeline: load, infer, reconcile, apply.
pub struct RosterSync {
    config: SyncConfig,
    loader: CsvLoader,
    detector: FieldDetector,
    reconciler: Reconciler,
}

impl RosterSync {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            loader: CsvLoader::with_config(config.loader.clone()),
            detector: FieldDetector::with_config(config.inference.clone()),
            reconciler: Reconciler::new(),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Load CSV bytes, recording `file_name` in the metadata.
    pub fn load_bytes(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
    ) -> Result<(DataTable, SourceMetadata)> {
        let (table, source) = self.loader.load_bytes(bytes)?;
        let source = match file_name {
            Some(name) => source.with_file_name(name),
            None => source,
        };
        Ok((table, source))
    }

    /// Load a CSV file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        self.loader.load_file(path)
    }

    /// Summarize a loaded table for the mapping step.
    pub fn analyze_table(&self, table: &DataTable, source: SourceMetadata) -> UploadAnalysis {
        let detection = self.detector.detect(table);
        let preview = extract_preview(table, self.config.preview_rows);

        UploadAnalysis {
            headers: preview.headers,
            preview: preview.rows,
            auto_mapping: detection.mapping,
            total_rows: preview.total_rows,
            columns: detection.columns,
            source,
        }
    }

    /// Load CSV bytes and analyze them.
    ///
    /// # Example
    ///
    /// ```
    /// use rostersync::{ColumnRef, RosterSync};
    ///
    /// let csv = "氏名,メールアドレス\n田中 太郎,tanaka@example.com\n";
    /// let analysis = RosterSync::new().analyze_bytes(csv.as_bytes(), Some("users.csv")).unwrap();
    ///
    /// assert_eq!(analysis.total_rows, 1);
    /// assert_eq!(analysis.auto_mapping.email, ColumnRef::Single(1));
    /// ```
    pub fn analyze_bytes(&self, bytes: &[u8], file_name: Option<&str>) -> Result<UploadAnalysis> {
        let (table, source) = self.load_bytes(bytes, file_name)?;
        Ok(self.analyze_table(&table, source))
    }

    /// Suggested field mapping for a table.
    pub fn detect_mapping(&self, table: &DataTable) -> FieldMapping {
        self.detector.auto_detect_fields(table)
    }

    /// Full change set between a table and the roster.
    pub fn compare(
        &self,
        table: &DataTable,
        mapping: &FieldMapping,
        roster: &Roster,
    ) -> Result<ChangeSet> {
        self.reconciler.compare_users(table, mapping, roster)
    }

    /// Change set trimmed for display.
    pub fn preview_sync(
        &self,
        table: &DataTable,
        mapping: &FieldMapping,
        roster: &Roster,
    ) -> Result<SyncPreview> {
        let changes = self.compare(table, mapping, roster)?;
        Ok(changes.preview(self.config.change_preview_limit))
    }

    /// Reconcile and apply the result to `store`.
    pub fn execute_sync(
        &self,
        table: &DataTable,
        mapping: &FieldMapping,
        roster: &Roster,
        store: &dyn IdentityStore,
        dry_run: bool,
    ) -> Result<SyncResult> {
        let changes = self.compare(table, mapping, roster)?;
        SyncExecutor::new(store).execute_sync(&changes, dry_run)
    }
}

impl Default for RosterSync {
    fn default() -> Self {
        Self::new()
    }
}
