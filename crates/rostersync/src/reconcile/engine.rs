//! Diff a CSV dataset against the roster.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{Result, SyncError};
use crate::input::DataTable;
use crate::mapping::{FieldMapping, FieldType};
use crate::roster::Roster;

use super::change::{ChangeSet, FieldChange, UserData, UserDeletion, UserUpdate};

/// Placeholder some spreadsheet exports write for an empty cell.
const NAN_PLACEHOLDER: &str = "nan";

/// Computes adds, updates and deletes between a dataset and a roster.
///
/// The reconciler only reads its inputs; applying the result is the
/// job of [`crate::sync::SyncExecutor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Compare every CSV row with the roster.
    ///
    /// Rows whose email resolves to blank or `"nan"` are skipped and do
    /// not count as seen, so a roster user on such a row is scheduled for
    /// deletion. Rows sharing an email are handled independently.
    pub fn compare_users(
        &self,
        table: &DataTable,
        mapping: &FieldMapping,
        roster: &Roster,
    ) -> Result<ChangeSet> {
        Self::validate(table, mapping)?;

        let mut changes = ChangeSet::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut skipped = 0usize;

        for (row_idx, row) in table.rows.iter().enumerate() {
            let email = mapping.email.resolve(row);
            if email.is_empty() || email == NAN_PLACEHOLDER {
                tracing::debug!(row = row_idx, "Skipping row without email");
                skipped += 1;
                continue;
            }
            seen.insert(email.clone());

            let data = UserData {
                name: mapping.name.resolve(row),
                position: mapping.position.resolve(row),
                department: mapping.department.resolve(row),
                email,
            };

            match roster.get(&data.email) {
                Some(existing) => {
                    let mut diff = IndexMap::new();
                    for field in FieldType::DIFFED {
                        let old = existing.field(field);
                        let new = data.field(field);
                        if old != new {
                            diff.insert(
                                field,
                                FieldChange {
                                    old: old.to_string(),
                                    new: new.to_string(),
                                },
                            );
                        }
                    }

                    if !diff.is_empty() {
                        changes.update_users.push(UserUpdate {
                            email: data.email.clone(),
                            changes: diff,
                            new_data: data,
                        });
                    }
                }
                None => changes.new_users.push(data),
            }
        }

        for record in roster.iter() {
            if !seen.contains(&record.email) {
                changes.delete_users.push(UserDeletion {
                    email: record.email.clone(),
                    id: record.id.clone(),
                    name: record.field(FieldType::Name).to_string(),
                    position: record.field(FieldType::Position).to_string(),
                    department: record.field(FieldType::Department).to_string(),
                });
            }
        }

        tracing::info!(
            to_add = changes.new_users.len(),
            to_update = changes.update_users.len(),
            to_delete = changes.delete_users.len(),
            skipped,
            "Reconciliation complete"
        );

        Ok(changes)
    }

    fn validate(table: &DataTable, mapping: &FieldMapping) -> Result<()> {
        if mapping.email.is_absent() {
            return Err(SyncError::Configuration(
                "Email column is not mapped".to_string(),
            ));
        }
        if !mapping.email.is_within(table.column_count()) {
            return Err(SyncError::Configuration(format!(
                "Email column {} is outside the {} available columns",
                mapping.email,
                table.column_count()
            )));
        }
        Ok(())
    }
}
