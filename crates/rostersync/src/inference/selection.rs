//! Picks the best column for each field type.

use serde::{Deserialize, Serialize};

use super::scoring::{ColumnScorer, ColumnScores};
use crate::input::DataTable;
use crate::mapping::{ColumnRef, FieldMapping, FieldType};

/// Configuration for field inference.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Maximum non-missing values sampled per column.
    pub sample_size: usize,
    /// Minimum score for a column to be assigned to a field.
    pub threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            threshold: 0.5,
        }
    }
}

/// Scores of one column, with its position and header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredColumn {
    pub index: usize,
    pub header: String,
    pub scores: ColumnScores,
}

/// Full result of field detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDetection {
    /// The selected mapping.
    pub mapping: FieldMapping,
    /// Scores for every column, in table order.
    pub columns: Vec<ScoredColumn>,
}

/// Detects which columns hold which fields.
pub struct FieldDetector {
    scorer: ColumnScorer,
    config: InferenceConfig,
}

impl FieldDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            scorer: ColumnScorer::new(config.sample_size),
            config,
        }
    }

    /// Score every column of a table.
    pub fn score_columns(&self, table: &DataTable) -> Vec<ScoredColumn> {
        table
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| ScoredColumn {
                index,
                header: header.clone(),
                scores: self.scorer.analyze_table_column(table, index),
            })
            .collect()
    }

    /// Score all columns and select a column per field type.
    pub fn detect(&self, table: &DataTable) -> FieldDetection {
        let columns = self.score_columns(table);
        let mut mapping = FieldMapping::new();

        for field in FieldType::ALL {
            if let Some((index, score)) = best_column(&columns, field) {
                if score >= self.config.threshold {
                    tracing::debug!(field = %field, column = index, score, "Selected column");
                    mapping.set(field, ColumnRef::Single(index));
                } else {
                    tracing::debug!(field = %field, column = index, score, "Best column below threshold");
                }
            }
        }

        FieldDetection { mapping, columns }
    }

    /// Select a column per field type. The same column may be chosen for
    /// more than one field.
    pub fn auto_detect_fields(&self, table: &DataTable) -> FieldMapping {
        self.detect(table).mapping
    }
}

impl Default for FieldDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest-scoring column with a positive score; the first one wins ties.
fn best_column(columns: &[ScoredColumn], field: FieldType) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for column in columns {
        let score = column.scores.get(field);
        if score <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((column.index, score)),
        }
    }
    best
}
