//! Identity store trait and shared types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute holding the user's email.
pub const ATTR_EMAIL: &str = "email";
/// Attribute holding the user's position.
pub const ATTR_POSITION: &str = "custom:position";
/// Attribute holding the user's department.
pub const ATTR_DEPARTMENT: &str = "custom:department";

/// Named attributes sent to the store, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAttributes(IndexMap<String, String>);

impl UserAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`UserAttributes::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Failure reported by an identity store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A user with this email already exists.
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    /// No user with this email exists.
    #[error("User not found: {0}")]
    NotFound(String),

    /// The store refused the operation for this record.
    #[error("{0}")]
    Rejected(String),

    /// The store cannot be reached at all. Aborts the whole batch.
    #[error("Identity store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the error affects every remaining operation, not just one record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// The detail carried by the error, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            StoreError::AlreadyExists(msg)
            | StoreError::NotFound(msg)
            | StoreError::Rejected(msg)
            | StoreError::Unavailable(msg) => msg,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// An external user directory that sync results are applied to.
///
/// Implementations must be thread-safe (Send + Sync) so the HTTP service
/// can share a single handle across requests.
pub trait IdentityStore: Send + Sync {
    /// Create a user with the given attributes. No invitation is sent.
    fn create(&self, email: &str, attributes: &UserAttributes) -> StoreResult<()>;

    /// Overwrite the given attributes of an existing user.
    fn update_attributes(&self, email: &str, attributes: &UserAttributes) -> StoreResult<()>;

    /// Remove a user.
    fn delete(&self, email: &str) -> StoreResult<()>;

    /// Get the name of this store (for logging/debugging).
    fn name(&self) -> &str;
}
