/// Persistent record of completed moves, used by undo.
///
/// The log lives in a hidden sidecar file inside the organized directory
/// as a JSON array of `{"from": ..., "to": ...}` objects in move order.
/// A record whose move also created the category folder carries
/// `"created_dir": true`, so undo knows which folders it may remove.
use crate::file_organizer::{OrganizeError, OrganizeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the sidecar file holding the move log.
pub const SIDECAR_FILE_NAME: &str = ".dirsort_undo.json";

/// One completed relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveRecord {
    /// Absolute path of the file before it was moved.
    pub from: PathBuf,
    /// Absolute path the file was moved to.
    pub to: PathBuf,
    /// The parent folder of `to` did not exist before this move.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub created_dir: bool,
}

impl MoveRecord {
    pub fn new(from: PathBuf, to: PathBuf) -> Self {
        Self {
            from,
            to,
            created_dir: false,
        }
    }
}

/// Ordered sequence of moves; insertion order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveLog {
    records: Vec<MoveRecord>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Appends all records of `other` after the existing ones.
    pub fn extend(&mut self, other: MoveLog) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the sidecar path for a directory.
    pub fn sidecar_path(directory: &Path) -> PathBuf {
        directory.join(SIDECAR_FILE_NAME)
    }

    /// Writes the log to the sidecar, replacing whatever was there.
    pub fn save(&self, directory: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::HistoryWriteFailed {
                source: std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            }
        })?;

        fs::write(Self::sidecar_path(directory), json)
            .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })
    }

    /// Loads the sidecar. Returns `Ok(None)` when there is none.
    pub fn load(directory: &Path) -> OrganizeResult<Option<Self>> {
        let content = match fs::read_to_string(Self::sidecar_path(directory)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OrganizeError::HistoryReadFailed { source: e }),
        };

        let log = serde_json::from_str(&content).map_err(|e| {
            OrganizeError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            }
        })?;
        Ok(Some(log))
    }

    /// Removes the sidecar if present.
    pub fn delete(directory: &Path) -> OrganizeResult<()> {
        match fs::remove_file(Self::sidecar_path(directory)) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(OrganizeError::HistoryWriteFailed { source: e })
            }
            _ => Ok(()),
        }
    }
}
