//! CLI command implementations.

pub mod analyze;
pub mod preview;
pub mod serve;
pub mod sync;
