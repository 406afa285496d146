//! In-memory identity store for tests and local simulation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;

use crate::roster::Roster;

use super::provider::{
    ATTR_DEPARTMENT, ATTR_EMAIL, ATTR_POSITION, IdentityStore, StoreError, StoreResult,
    UserAttributes,
};

/// A call made against an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create(String),
    Update(String),
    Delete(String),
}

#[derive(Debug, Default)]
struct State {
    users: IndexMap<String, UserAttributes>,
    calls: Vec<StoreCall>,
    failures: HashMap<String, StoreError>,
    unavailable: Option<String>,
}

/// Identity store held in memory, with failure injection.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding every user of `roster`.
    pub fn from_roster(roster: &Roster) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for record in roster.iter() {
                let mut attrs = UserAttributes::new().with(ATTR_EMAIL, record.email.clone());
                if let Some(position) = &record.position {
                    attrs.insert(ATTR_POSITION, position.clone());
                }
                if let Some(department) = &record.department {
                    attrs.insert(ATTR_DEPARTMENT, department.clone());
                }
                state.users.insert(record.email.clone(), attrs);
            }
        }
        store
    }

    /// Make every operation on `email` fail with `error`.
    pub fn fail_on(&self, email: impl Into<String>, error: StoreError) {
        self.lock().failures.insert(email.into(), error);
    }

    /// Make every operation fail as if the store were unreachable.
    pub fn set_unavailable(&self, reason: Option<String>) {
        self.lock().unavailable = reason;
    }

    /// Current attributes of a user.
    pub fn user(&self, email: &str) -> Option<UserAttributes> {
        self.lock().users.get(email).cloned()
    }

    /// Emails currently in the store, in insertion order.
    pub fn emails(&self) -> Vec<String> {
        self.lock().users.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().users.is_empty()
    }

    /// Every call received so far, including failed ones.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: StoreCall) -> MutexGuard<'_, State> {
        let mut state = self.lock();
        state.calls.push(call);
        state
    }

    fn check(state: &State, email: &str) -> StoreResult<()> {
        if let Some(reason) = &state.unavailable {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        match state.failures.get(email) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl IdentityStore for InMemoryStore {
    fn create(&self, email: &str, attributes: &UserAttributes) -> StoreResult<()> {
        let mut state = self.record(StoreCall::Create(email.to_string()));
        Self::check(&state, email)?;

        if state.users.contains_key(email) {
            return Err(StoreError::AlreadyExists(email.to_string()));
        }
        state.users.insert(email.to_string(), attributes.clone());
        Ok(())
    }

    fn update_attributes(&self, email: &str, attributes: &UserAttributes) -> StoreResult<()> {
        let mut state = self.record(StoreCall::Update(email.to_string()));
        Self::check(&state, email)?;

        let user = state
            .users
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;
        for (name, value) in attributes.iter() {
            user.insert(name, value);
        }
        Ok(())
    }

    fn delete(&self, email: &str) -> StoreResult<()> {
        let mut state = self.record(StoreCall::Delete(email.to_string()));
        Self::check(&state, email)?;

        state
            .users
            .shift_remove(email)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterRecord;

    #[test]
    fn test_create_update_delete() {
        let store = InMemoryStore::new();
        let attrs = UserAttributes::new().with(ATTR_EMAIL, "a@example.com");

        store.create("a@example.com", &attrs).unwrap();
        store
            .update_attributes(
                "a@example.com",
                &UserAttributes::new().with(ATTR_POSITION, "Mgr"),
            )
            .unwrap();
        assert_eq!(
            store.user("a@example.com").unwrap().get(ATTR_POSITION),
            Some("Mgr")
        );

        store.delete("a@example.com").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.calls().len(), 3);
    }

    #[test]
    fn test_duplicate_create_and_missing_delete() {
        let store = InMemoryStore::from_roster(&Roster::from_records([RosterRecord::new(
            "a@example.com",
        )]));

        assert_eq!(
            store.create("a@example.com", &UserAttributes::new()),
            Err(StoreError::AlreadyExists("a@example.com".to_string()))
        );
        assert_eq!(
            store.delete("b@example.com"),
            Err(StoreError::NotFound("b@example.com".to_string()))
        );
    }

    #[test]
    fn test_injected_failures() {
        let store = InMemoryStore::new();
        store.fail_on("bad@example.com", StoreError::Rejected("invalid".into()));

        assert!(store.create("bad@example.com", &UserAttributes::new()).is_err());
        assert!(store.create("ok@example.com", &UserAttributes::new()).is_ok());

        store.set_unavailable(Some("connection refused".into()));
        let err = store.delete("ok@example.com").unwrap_err();
        assert!(err.is_fatal());
    }
}
