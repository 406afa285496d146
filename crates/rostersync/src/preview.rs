//! Bounded sample of a dataset for display.

use serde::{Deserialize, Serialize};

use crate::input::DataTable;

/// Default number of preview rows.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// First rows of a dataset, rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPreview {
    /// Column headers.
    pub headers: Vec<String>,
    /// Up to N rows; missing cells are empty strings.
    pub rows: Vec<Vec<String>>,
    /// Total row count of the dataset.
    pub total_rows: usize,
}

impl DataPreview {
    /// Whether rows were left out of the preview.
    pub fn truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }
}

/// Take the first `rows` rows of `table`.
pub fn extract_preview(table: &DataTable, rows: usize) -> DataPreview {
    DataPreview {
        headers: table.headers.clone(),
        rows: table
            .rows
            .iter()
            .take(rows)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.clone().unwrap_or_default())
                    .collect()
            })
            .collect(),
        total_rows: table.row_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_renders_missing_as_empty() {
        let table = DataTable::from_strings(&["a", "b"], &[vec!["1", ""], vec!["", "2"]]);
        let preview = extract_preview(&table, DEFAULT_PREVIEW_ROWS);

        assert_eq!(preview.headers, vec!["a", "b"]);
        assert_eq!(preview.rows, vec![vec!["1", ""], vec!["", "2"]]);
        assert!(!preview.truncated());
    }

    #[test]
    fn test_preview_is_bounded() {
        let rows: Vec<Vec<String>> = (0..25).map(|i| vec![i.to_string()]).collect();
        let table = DataTable::from_strings(&["n".to_string()], &rows);
        let preview = extract_preview(&table, 10);

        assert_eq!(preview.rows.len(), 10);
        assert_eq!(preview.rows[9], vec!["9"]);
        assert_eq!(preview.total_rows, 25);
        assert!(preview.truncated());
    }
}
