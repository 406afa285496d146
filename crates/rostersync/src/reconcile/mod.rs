//! Reconciliation of CSV rows against the prior roster.

mod change;
mod engine;

pub use change::{
    ChangeSet, ChangeSummary, DEFAULT_CHANGE_PREVIEW_LIMIT, FieldChange, SyncPreview, UserData,
    UserDeletion, UserUpdate,
};
pub use engine::Reconciler;
