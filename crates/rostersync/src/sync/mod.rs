//! Sync execution and the per-operation log.

mod executor;

pub use executor::{SyncExecutor, SyncFailure, SyncOperation, SyncOutcome, SyncRecord, SyncResult};
