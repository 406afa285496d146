//! Roster files: `{"users": [{"id", "email", "name", "position", "department"}]}`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

use super::record::{Roster, RosterRecord};

#[derive(Serialize, Deserialize)]
struct RosterFile {
    users: Vec<RosterRecord>,
}

impl Roster {
    /// Load a roster from a JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rostersync::Roster;
    ///
    /// let roster = Roster::load("existing-users.json").unwrap();
    /// println!("Known users: {}", roster.len());
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            SyncError::Roster(format!("Failed to open roster '{}': {}", path.display(), e))
        })?;

        let parsed: RosterFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SyncError::Roster(format!("Failed to parse roster '{}': {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), users = parsed.users.len(), "Loaded roster");

        Ok(Roster::from_records(parsed.users))
    }

    /// Parse a roster from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: RosterFile = serde_json::from_str(json)
            .map_err(|e| SyncError::Roster(format!("Failed to parse roster: {}", e)))?;
        Ok(Roster::from_records(parsed.users))
    }

    /// Save the roster to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SyncError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| SyncError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let contents = RosterFile {
            users: self.iter().cloned().collect(),
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &contents)?;

        Ok(())
    }
}
