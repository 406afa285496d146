//! Apply a change set to an identity store.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::mapping::FieldType;
use crate::reconcile::{ChangeSet, UserData, UserUpdate};
use crate::store::{
    ATTR_DEPARTMENT, ATTR_EMAIL, ATTR_POSITION, IdentityStore, StoreError, UserAttributes,
};

/// Kind of store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Add,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Add => "add",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one attempted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Success,
    Failure,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Success => "success",
            SyncOutcome::Failure => "failure",
        }
    }
}

/// A per-record failure. Processing continued past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub email: String,
    pub operation: SyncOperation,
    pub error: String,
}

/// Log entry for one attempted operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub processed_at: DateTime<Utc>,
    pub operation: SyncOperation,
    pub email: String,
    pub outcome: SyncOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Users created (or planned, for a dry run).
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Failures in processing order.
    pub errors: Vec<SyncFailure>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub dry_run: bool,
    /// One entry per attempted operation.
    pub records: Vec<SyncRecord>,
}

impl SyncResult {
    fn started(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            added: 0,
            updated: 0,
            deleted: 0,
            errors: Vec::new(),
            start_time: now,
            end_time: now,
            dry_run,
            records: Vec::new(),
        }
    }

    /// True when every attempted operation succeeded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn succeed(&mut self, operation: SyncOperation, email: &str) {
        match operation {
            SyncOperation::Add => self.added += 1,
            SyncOperation::Update => self.updated += 1,
            SyncOperation::Delete => self.deleted += 1,
        }
        self.records.push(SyncRecord {
            processed_at: Utc::now(),
            operation,
            email: email.to_string(),
            outcome: SyncOutcome::Success,
            error: None,
        });
    }

    fn fail(&mut self, operation: SyncOperation, email: &str, error: String) {
        tracing::warn!(%operation, email, %error, "Sync operation failed");
        self.errors.push(SyncFailure {
            email: email.to_string(),
            operation,
            error: error.clone(),
        });
        self.records.push(SyncRecord {
            processed_at: Utc::now(),
            operation,
            email: email.to_string(),
            outcome: SyncOutcome::Failure,
            error: Some(error),
        });
    }

    /// Write the per-operation log as CSV with columns
    /// `processed_at,operation,email,result,error`.
    pub fn write_log_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["processed_at", "operation", "email", "result", "error"])?;
        for record in &self.records {
            csv.write_record([
                record.processed_at.to_rfc3339().as_str(),
                record.operation.as_str(),
                record.email.as_str(),
                record.outcome.as_str(),
                record.error.as_deref().unwrap_or(""),
            ])?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Applies change sets to an identity store.
pub struct SyncExecutor<'a> {
    store: &'a dyn IdentityStore,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(store: &'a dyn IdentityStore) -> Self {
        Self { store }
    }

    /// Apply `changes`: creates, then updates, then deletes.
    ///
    /// A dry run touches nothing and reports every planned operation as
    /// successful. Per-record failures are collected and processing
    /// continues; an unreachable store aborts the batch with
    /// [`SyncError::StoreUnavailable`], which carries the partial result.
    pub fn execute_sync(&self, changes: &ChangeSet, dry_run: bool) -> Result<SyncResult> {
        let mut result = SyncResult::started(dry_run);
        tracing::info!(
            store = self.store.name(),
            dry_run,
            planned = changes.total(),
            "Sync started"
        );

        for user in &changes.new_users {
            if dry_run {
                result.succeed(SyncOperation::Add, &user.email);
                continue;
            }
            let attributes = create_attributes(user);
            self.apply(&mut result, SyncOperation::Add, &user.email, || {
                self.store.create(&user.email, &attributes)
            })?;
        }

        for update in &changes.update_users {
            let attributes = update_attributes(update);
            if dry_run || attributes.is_empty() {
                result.succeed(SyncOperation::Update, &update.email);
                continue;
            }
            self.apply(&mut result, SyncOperation::Update, &update.email, || {
                self.store.update_attributes(&update.email, &attributes)
            })?;
        }

        for deletion in &changes.delete_users {
            if dry_run {
                result.succeed(SyncOperation::Delete, &deletion.email);
                continue;
            }
            self.apply(&mut result, SyncOperation::Delete, &deletion.email, || {
                self.store.delete(&deletion.email)
            })?;
        }

        result.end_time = Utc::now();
        tracing::info!(
            added = result.added,
            updated = result.updated,
            deleted = result.deleted,
            errors = result.errors.len(),
            "Sync finished"
        );

        Ok(result)
    }

    fn apply(
        &self,
        result: &mut SyncResult,
        operation: SyncOperation,
        email: &str,
        call: impl FnOnce() -> std::result::Result<(), StoreError>,
    ) -> Result<()> {
        match call() {
            Ok(()) => result.succeed(operation, email),
            Err(e) if e.is_fatal() => {
                let reason = e.message().to_string();
                tracing::error!(
                    %operation,
                    email,
                    %reason,
                    applied = result.added + result.updated + result.deleted,
                    "Identity store unavailable, aborting sync"
                );
                result.fail(operation, email, e.to_string());
                result.end_time = Utc::now();
                return Err(SyncError::StoreUnavailable {
                    reason,
                    partial: Some(Box::new(result.clone())),
                });
            }
            Err(e) => result.fail(operation, email, e.to_string()),
        }
        Ok(())
    }
}

fn create_attributes(user: &UserData) -> UserAttributes {
    UserAttributes::new()
        .with(ATTR_EMAIL, user.email.clone())
        .with(ATTR_POSITION, user.position.clone())
        .with(ATTR_DEPARTMENT, user.department.clone())
}

/// Position and department attributes for the fields that changed.
/// Name changes are reported but never written.
fn update_attributes(update: &UserUpdate) -> UserAttributes {
    let mut attributes = UserAttributes::new();
    if update.changed(FieldType::Position) {
        attributes.insert(ATTR_POSITION, update.new_data.position.clone());
    }
    if update.changed(FieldType::Department) {
        attributes.insert(ATTR_DEPARTMENT, update.new_data.department.clone());
    }
    attributes
}
