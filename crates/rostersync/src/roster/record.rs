//! Previously known users, keyed by email.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mapping::FieldType;

/// A user already known to the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    /// Opaque identifier assigned by the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Email address, the roster key. Case-sensitive.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl RosterRecord {
    /// Create a record with only an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
            position: None,
            department: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Stored value of a field; missing values read as the empty string.
    pub fn field(&self, field: FieldType) -> &str {
        let value = match field {
            FieldType::Name => &self.name,
            FieldType::Email => return &self.email,
            FieldType::Position => &self.position,
            FieldType::Department => &self.department,
        };
        value.as_deref().unwrap_or("")
    }
}

/// Read-only lookup of known users, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    users: IndexMap<String, RosterRecord>,
}

impl Roster {
    /// An empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from records. A repeated email replaces the earlier
    /// record but keeps its original position.
    pub fn from_records(records: impl IntoIterator<Item = RosterRecord>) -> Self {
        let mut users = IndexMap::new();
        for record in records {
            users.insert(record.email.clone(), record);
        }
        Self { users }
    }

    /// Look up a user by exact email.
    pub fn get(&self, email: &str) -> Option<&RosterRecord> {
        self.users.get(email)
    }

    pub fn contains(&self, email: &str) -> bool {
        self.users.contains_key(email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Records in source order.
    pub fn iter(&self) -> impl Iterator<Item = &RosterRecord> {
        self.users.values()
    }
}

impl FromIterator<RosterRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = RosterRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
