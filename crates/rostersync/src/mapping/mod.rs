//! Field mapping types shared by inference and reconciliation.

mod types;

pub use types::{ColumnRef, FieldMapping, FieldType};
