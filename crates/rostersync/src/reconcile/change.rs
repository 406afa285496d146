//! Change set types produced by reconciliation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mapping::FieldType;

/// Default number of entries kept per list in a [`SyncPreview`].
pub const DEFAULT_CHANGE_PREVIEW_LIMIT: usize = 10;

/// Resolved field values of one CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
}

impl UserData {
    /// Value of a field.
    pub fn field(&self, field: FieldType) -> &str {
        match field {
            FieldType::Name => &self.name,
            FieldType::Email => &self.email,
            FieldType::Position => &self.position,
            FieldType::Department => &self.department,
        }
    }
}

/// Old and new value of a changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: String,
    pub new: String,
}

/// An existing user whose attributes differ from the CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: String,
    /// Only the fields that changed, in name/position/department order.
    pub changes: IndexMap<FieldType, FieldChange>,
    /// Every resolved value from the CSV row.
    pub new_data: UserData,
}

impl UserUpdate {
    /// Whether `field` is among the changes.
    pub fn changed(&self, field: FieldType) -> bool {
        self.changes.contains_key(&field)
    }
}

/// A roster user absent from the CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeletion {
    pub email: String,
    pub id: Option<String>,
    pub name: String,
    pub position: String,
    pub department: String,
}

/// Counts per change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub to_add: usize,
    pub to_update: usize,
    pub to_delete: usize,
}

/// Full output of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub new_users: Vec<UserData>,
    pub update_users: Vec<UserUpdate>,
    pub delete_users: Vec<UserDeletion>,
}

impl ChangeSet {
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            to_add: self.new_users.len(),
            to_update: self.update_users.len(),
            to_delete: self.delete_users.len(),
        }
    }

    /// Number of planned operations.
    pub fn total(&self) -> usize {
        self.new_users.len() + self.update_users.len() + self.delete_users.len()
    }

    /// True when the CSV and roster already agree.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Cap each list at `limit` entries, keeping the full counts.
    pub fn preview(&self, limit: usize) -> SyncPreview {
        SyncPreview {
            summary: self.summary(),
            new_users: self.new_users.iter().take(limit).cloned().collect(),
            update_users: self.update_users.iter().take(limit).cloned().collect(),
            delete_users: self.delete_users.iter().take(limit).cloned().collect(),
        }
    }
}

/// A change set trimmed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPreview {
    pub summary: ChangeSummary,
    pub new_users: Vec<UserData>,
    pub update_users: Vec<UserUpdate>,
    pub delete_users: Vec<UserDeletion>,
}
