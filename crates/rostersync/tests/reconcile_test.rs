//! Reconciliation scenarios.

use rostersync::store::{StoreResult, UserAttributes};
use rostersync::{
    ColumnRef, DataTable, FieldMapping, FieldType, IdentityStore, Reconciler, Roster,
    RosterRecord, SyncExecutor,
};

fn mapping() -> FieldMapping {
    FieldMapping {
        name: ColumnRef::Single(0),
        email: ColumnRef::Single(1),
        position: ColumnRef::Single(2),
        department: ColumnRef::Single(3),
    }
}

fn table(rows: &[Vec<&str>]) -> DataTable {
    DataTable::from_strings(&["name", "email", "position", "department"], rows)
}

fn roster_of(records: &[(&str, &str, &str, &str)]) -> Roster {
    records
        .iter()
        .map(|(name, email, position, department)| {
            RosterRecord::new(*email)
                .with_name(*name)
                .with_position(*position)
                .with_department(*department)
        })
        .collect()
}

/// Store that fails the test if it is ever called.
struct PanickingStore;

impl IdentityStore for PanickingStore {
    fn create(&self, email: &str, _: &UserAttributes) -> StoreResult<()> {
        panic!("create called for {email}");
    }

    fn update_attributes(&self, email: &str, _: &UserAttributes) -> StoreResult<()> {
        panic!("update called for {email}");
    }

    fn delete(&self, email: &str) -> StoreResult<()> {
        panic!("delete called for {email}");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_matching_roster_yields_no_changes() {
    let table = table(&[vec!["A", "x@y.com", "Eng", "R&D"]]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D")]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    assert!(changes.is_empty());
}

#[test]
fn test_position_change_is_an_update() {
    let table = table(&[vec!["A", "x@y.com", "Mgr", "R&D"]]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D")]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    assert!(changes.new_users.is_empty());
    assert!(changes.delete_users.is_empty());
    assert_eq!(changes.update_users.len(), 1);

    let update = &changes.update_users[0];
    assert_eq!(update.email, "x@y.com");
    assert_eq!(update.changes.len(), 1);
    assert_eq!(update.changes[&FieldType::Position].old, "Eng");
    assert_eq!(update.changes[&FieldType::Position].new, "Mgr");
}

#[test]
fn test_user_missing_from_csv_is_deleted() {
    let table = table(&[vec!["A", "x@y.com", "Eng", "R&D"]]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D"), ("B", "z@y.com", "", "")]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    assert_eq!(changes.delete_users.len(), 1);
    assert_eq!(changes.delete_users[0].email, "z@y.com");
    assert_eq!(changes.delete_users[0].name, "B");
}

#[test]
fn test_blank_and_nan_emails_are_skipped() {
    let table = table(&[vec!["A", "", "Eng", "R&D"], vec!["B", "nan", "Eng", "R&D"]]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D")]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    assert!(changes.new_users.is_empty());
    assert!(changes.update_users.is_empty());
    assert_eq!(changes.delete_users.len(), 1);
    assert_eq!(changes.delete_users[0].email, "x@y.com");
}

#[test]
fn test_email_match_is_case_sensitive() {
    let table = table(&[vec!["A", "X@y.com", "Eng", "R&D"]]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D")]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    assert_eq!(changes.new_users.len(), 1);
    assert_eq!(changes.delete_users.len(), 1);
}

// =============================================================================
// Duplicate emails
// =============================================================================

#[test]
fn test_duplicate_rows_emit_independent_updates() {
    let table = table(&[
        vec!["A", "x@y.com", "Mgr", "R&D"],
        vec!["A", "x@y.com", "Dir", "R&D"],
    ]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D")]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    assert_eq!(changes.update_users.len(), 2);
    assert_eq!(changes.update_users[0].new_data.position, "Mgr");
    assert_eq!(changes.update_users[1].new_data.position, "Dir");
    assert!(changes.delete_users.is_empty());
}

#[test]
fn test_duplicate_unknown_rows_emit_two_new_users() {
    let table = table(&[
        vec!["A", "new@y.com", "", ""],
        vec!["A2", "new@y.com", "", ""],
    ]);

    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &Roster::new())
        .unwrap();

    let names: Vec<&str> = changes.new_users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["A", "A2"]);
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn test_dry_run_never_calls_store() {
    let table = table(&[
        vec!["A", "x@y.com", "Mgr", "R&D"],
        vec!["N", "new@y.com", "Eng", "Ops"],
    ]);
    let roster = roster_of(&[("A", "x@y.com", "Eng", "R&D"), ("Z", "z@y.com", "", "")]);
    let changes = Reconciler::new()
        .compare_users(&table, &mapping(), &roster)
        .unwrap();

    let store = PanickingStore;
    let executor = SyncExecutor::new(&store);
    let first = executor.execute_sync(&changes, true).unwrap();
    let second = executor.execute_sync(&changes, true).unwrap();

    assert_eq!((first.added, first.updated, first.deleted), (1, 1, 1));
    assert_eq!(
        (first.added, first.updated, first.deleted),
        (second.added, second.updated, second.deleted)
    );
    assert!(first.errors.is_empty());
}
