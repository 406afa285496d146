//! The prior roster that CSV rows are reconciled against.

mod persistence;
mod record;

pub use record::{Roster, RosterRecord};
