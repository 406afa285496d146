//! RosterSync: keep an identity store in step with a user roster CSV.
//!
//! A CSV export of users (name, email, position, department; often with
//! Japanese headers and Shift_JIS encoding) is loaded, its columns are mapped
//! to fields automatically, and the result is diffed against the users the
//! identity store already knows. The resulting change set can be previewed,
//! dry-run, or applied.
//!
//! # Core Principles
//!
//! - **Email is the key**: rows and roster users are matched by exact email
//! - **Non-destructive preview**: nothing is written until a live sync is requested
//! - **Partial updates**: only position and department are written on update
//!
//! # Example
//!
//! ```no_run
//! use rostersync::{InMemoryStore, Roster, RosterSync};
//!
//! let sync = RosterSync::new();
//! let (table, _source) = sync.load_file("users.csv").unwrap();
//! let mapping = sync.detect_mapping(&table);
//! let roster = Roster::load("existing-users.json").unwrap();
//!
//! let preview = sync.preview_sync(&table, &mapping, &roster).unwrap();
//! println!("To add: {}", preview.summary.to_add);
//!
//! let store = InMemoryStore::from_roster(&roster);
//! let result = sync.execute_sync(&table, &mapping, &roster, &store, true).unwrap();
//! println!("Dry run: {} added", result.added);
//! ```

pub mod error;
pub mod inference;
pub mod input;
pub mod mapping;
pub mod preview;
pub mod reconcile;
pub mod roster;
pub mod store;
pub mod sync;

mod rostersync;

pub use crate::rostersync::{RosterSync, SyncConfig, UploadAnalysis};
pub use error::{Result, SyncError};
pub use input::{DataTable, SourceMetadata};
pub use mapping::{ColumnRef, FieldMapping, FieldType};
pub use preview::{DataPreview, extract_preview};
pub use reconcile::{ChangeSet, ChangeSummary, Reconciler, SyncPreview};
pub use roster::{Roster, RosterRecord};
pub use store::{IdentityStore, InMemoryStore, RestIdentityStore, RestStoreConfig, StoreError};
pub use sync::{SyncExecutor, SyncFailure, SyncOperation, SyncResult};
