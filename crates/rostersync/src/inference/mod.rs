//! Field inference: which column holds the name, email, position and department.

mod scoring;
mod selection;
pub mod vocabulary;

pub use scoring::{ColumnScorer, ColumnScores, is_email};
pub use selection::{FieldDetection, FieldDetector, InferenceConfig, ScoredColumn};
