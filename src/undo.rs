/// Reverting an organize run from its undo sidecar.
///
/// Recorded moves are replayed newest first, so files come back in the
/// reverse of the order they left.
use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::move_log::{MoveLog, MoveRecord};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// What an undo run did.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files moved back to their original location.
    pub restored_files: usize,
    /// Records whose file was no longer at its recorded destination.
    pub skipped_files: Vec<(PathBuf, String)>,
    /// Records that could not be restored for any other reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files found at an original location, moved aside to the given path.
    pub backed_up: Vec<(PathBuf, PathBuf)>,
    /// Folders created by organize and removed because the undo left them empty.
    pub removed_dirs: Vec<PathBuf>,
    /// Set when the sidecar could not be deleted afterwards.
    pub history_error: Option<OrganizeError>,
}

impl UndoReport {
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// True if every record was restored.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

enum RestoreError {
    Missing(PathBuf, String),
    Failed(PathBuf, String),
}

/// Replays undo sidecars.
pub struct UndoManager;

impl UndoManager {
    /// Undoes every move recorded in `directory`'s sidecar.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. A malformed
    /// sidecar is an error and is left untouched. Once the replay has been
    /// attempted the sidecar is deleted, even if some records failed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/home/me/Downloads")) {
    ///     Ok(Some(report)) => println!("Restored {} files", report.restored_files),
    ///     Ok(None) => println!("Nothing to undo"),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(directory: &Path) -> OrganizeResult<Option<UndoReport>> {
        Self::undo_with(directory, |_, _| {})
    }

    /// Like [`UndoManager::undo`], calling `on_record` after each record.
    pub fn undo_with<F>(directory: &Path, mut on_record: F) -> OrganizeResult<Option<UndoReport>>
    where
        F: FnMut(&MoveRecord, Result<(), &str>),
    {
        if !directory.is_dir() {
            return Err(OrganizeError::DirectoryNotFound {
                path: directory.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "directory does not exist",
                ),
            });
        }

        let Some(log) = MoveLog::load(directory)? else {
            return Ok(None);
        };

        let mut report = UndoReport::default();
        // only folders the organize run created may be removed again
        let created_dirs: BTreeSet<PathBuf> = log
            .records()
            .iter()
            .filter(|record| record.created_dir)
            .filter_map(|record| record.to.parent().map(Path::to_path_buf))
            .collect();

        for record in log.records().iter().rev() {
            match Self::restore_file(record) {
                Ok(backup) => {
                    on_record(record, Ok(()));
                    report.restored_files += 1;
                    if let Some(backup) = backup {
                        report.backed_up.push((record.from.clone(), backup));
                    }
                }
                Err(RestoreError::Missing(path, reason)) => {
                    on_record(record, Err(reason.as_str()));
                    report.skipped_files.push((path, reason));
                }
                Err(RestoreError::Failed(path, reason)) => {
                    on_record(record, Err(reason.as_str()));
                    report.failed_restores.push((path, reason));
                }
            }
        }

        report.removed_dirs = Self::prune_empty_dirs(directory, &created_dirs);

        if let Err(e) = MoveLog::delete(directory) {
            report.history_error = Some(e);
        }

        Ok(Some(report))
    }

    /// Moves one file back. Returns the backup path if something at the
    /// original location had to be moved aside first.
    fn restore_file(record: &MoveRecord) -> Result<Option<PathBuf>, RestoreError> {
        if fs::symlink_metadata(&record.to).is_err() {
            return Err(RestoreError::Missing(
                record.to.clone(),
                "File not found at recorded destination".to_string(),
            ));
        }

        if let Some(parent) = record.from.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RestoreError::Failed(
                    parent.to_path_buf(),
                    format!("Could not recreate original directory: {}", e),
                )
            })?;
        }

        let mut backup = None;
        if fs::symlink_metadata(&record.from).is_ok() {
            let backup_path = Self::generate_backup_path(&record.from);
            fs::rename(&record.from, &backup_path).map_err(|e| {
                RestoreError::Failed(
                    record.from.clone(),
                    format!("Could not back up conflicting file: {}", e),
                )
            })?;
            backup = Some(backup_path);
        }

        fs::rename(&record.to, &record.from).map_err(|e| {
            RestoreError::Failed(record.to.clone(), format!("Failed to restore file: {}", e))
        })?;

        Ok(backup)
    }

    /// Removes the given folders inside `directory` that are now empty.
    fn prune_empty_dirs(directory: &Path, candidates: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
        candidates
            .iter()
            .filter(|dir| dir.as_path() != directory && dir.starts_with(directory))
            .filter(|dir| {
                fs::read_dir(dir)
                    .map(|mut entries| entries.next().is_none())
                    .unwrap_or(false)
            })
            .filter(|dir| fs::remove_dir(dir).is_ok())
            .cloned()
            .collect()
    }

    /// Appends a timestamp to a file name: `a.txt` becomes
    /// `a.txt.bak.20251109-143052`.
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let backup = original_path.with_file_name(format!("{}.bak.{}", filename, timestamp));
        if fs::symlink_metadata(&backup).is_err() {
            return backup;
        }
        // same second, several conflicts
        (1..)
            .map(|n| original_path.with_file_name(format!("{}.bak.{}-{}", filename, timestamp, n)))
            .find(|candidate| fs::symlink_metadata(candidate).is_err())
            .unwrap_or(backup)
    }
}
