//! Identity store integration.
//!
//! Sync results are applied through the [`IdentityStore`] trait. Two
//! implementations are provided:
//!
//! - [`InMemoryStore`]: in-process store with failure injection, for tests
//!   and local simulation.
//! - [`RestIdentityStore`]: JSON REST API over blocking `reqwest`.

mod memory;
mod provider;
mod rest;

pub use memory::{InMemoryStore, StoreCall};
pub use provider::{
    ATTR_DEPARTMENT, ATTR_EMAIL, ATTR_POSITION, IdentityStore, StoreError, StoreResult,
    UserAttributes,
};
pub use rest::{DEFAULT_TIMEOUT_SECS, RestIdentityStore, RestStoreConfig};
