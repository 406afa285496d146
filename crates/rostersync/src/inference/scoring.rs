//! Per-column scoring against the four field types.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::vocabulary::{
    DEPARTMENT_HEADER_KEYWORDS, DEPARTMENT_VALUE_TOKENS, KANJI, KATAKANA, NAME_HEADER_KEYWORDS,
    NAME_VALUE_TOKENS, POSITION_HEADER_KEYWORDS, POSITION_VALUE_TOKENS,
};
use crate::input::DataTable;
use crate::mapping::FieldType;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Weight of a header keyword hit, and of a value indicator hit.
const HEADER_WEIGHT: f64 = 0.5;
const VALUE_WEIGHT: f64 = 0.5;

/// Check whether a value looks like an email address.
pub fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Scores for one column, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnScores {
    pub name: f64,
    pub email: f64,
    pub position: f64,
    pub department: f64,
}

impl ColumnScores {
    /// Score for a field type.
    pub fn get(&self, field: FieldType) -> f64 {
        match field {
            FieldType::Name => self.name,
            FieldType::Email => self.email,
            FieldType::Position => self.position,
            FieldType::Department => self.department,
        }
    }
}

/// Scores columns by header keywords and sampled values.
#[derive(Debug, Clone)]
pub struct ColumnScorer {
    sample_size: usize,
}

impl ColumnScorer {
    /// Create a scorer sampling up to `sample_size` non-missing values per column.
    pub fn new(sample_size: usize) -> Self {
        Self { sample_size }
    }

    /// Score column `col_index` of `table`.
    pub fn analyze_table_column(&self, table: &DataTable, col_index: usize) -> ColumnScores {
        let header = table
            .headers
            .get(col_index)
            .map(String::as_str)
            .unwrap_or("");
        self.analyze_column(header, table.present_values(col_index))
    }

    /// Score a column given its header and its non-missing values.
    pub fn analyze_column<'a>(
        &self,
        header: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> ColumnScores {
        let sample: Vec<&str> = values.into_iter().take(self.sample_size).collect();
        if sample.is_empty() {
            return ColumnScores::default();
        }

        let email_matches = sample.iter().filter(|v| is_email(v)).count();
        let header = header.to_lowercase();
        let lowered: Vec<String> = sample.iter().map(|v| v.to_lowercase()).collect();

        let mut scores = ColumnScores {
            email: email_matches as f64 / sample.len() as f64,
            ..ColumnScores::default()
        };

        if contains_any(&header, NAME_HEADER_KEYWORDS) {
            scores.name += HEADER_WEIGHT;
        }
        if looks_like_names(&sample) {
            scores.name += VALUE_WEIGHT;
        }

        if contains_any(&header, POSITION_HEADER_KEYWORDS) {
            scores.position += HEADER_WEIGHT;
        }
        if lowered.iter().any(|v| contains_any(v, POSITION_VALUE_TOKENS)) {
            scores.position += VALUE_WEIGHT;
        }

        if contains_any(&header, DEPARTMENT_HEADER_KEYWORDS) {
            scores.department += HEADER_WEIGHT;
        }
        if lowered.iter().any(|v| contains_any(v, DEPARTMENT_VALUE_TOKENS)) {
            scores.department += VALUE_WEIGHT;
        }

        scores
    }
}

impl Default for ColumnScorer {
    fn default() -> Self {
        Self::new(100)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Name heuristic: a known name token, or katakana and kanji both present
/// somewhere in the sample.
fn looks_like_names(sample: &[&str]) -> bool {
    if sample.iter().any(|v| contains_any(v, NAME_VALUE_TOKENS)) {
        return true;
    }

    let chars = || sample.iter().flat_map(|v| v.chars());
    chars().any(|c| KATAKANA.contains(&c)) && chars().any(|c| KANJI.contains(&c))
}
