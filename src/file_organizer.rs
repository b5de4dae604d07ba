/// Sorting the files of a directory into category subfolders.
///
/// Organizing happens in two steps: [`Organizer::plan`] lists and classifies
/// the files without touching anything, [`Organizer::execute`] carries the
/// plan out and records every completed move in the undo sidecar.
use crate::file_category::{Category, CategoryTable};
use crate::move_log::{MoveLog, MoveRecord, SIDECAR_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while organizing or undoing.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target directory does not exist or cannot be listed.
    DirectoryNotFound {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A single directory entry could not be inspected.
    EntryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Something already occupies the destination; the file was left in place.
    DestinationExists { path: PathBuf },
    /// Failed to write or delete the undo sidecar.
    HistoryWriteFailed { source: std::io::Error },
    /// Failed to read the undo sidecar.
    HistoryReadFailed { source: std::io::Error },
    /// The undo sidecar is not a well-formed move log.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryNotFound { path, source } => {
                write!(f, "Cannot read directory {}: {}", path.display(), source)
            }
            Self::EntryUnreadable { path, source } => {
                write!(f, "Cannot inspect {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DestinationExists { path } => {
                write!(f, "Destination already exists: {}", path.display())
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write undo history: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read undo history: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid undo history format: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryNotFound { source, .. }
            | Self::EntryUnreadable { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::HistoryWriteFailed { source }
            | Self::HistoryReadFailed { source } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::DestinationExists { .. } | Self::InvalidHistoryFormat { .. } => None,
        }
    }
}

/// Result type for organize and undo operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A move computed from the directory listing but not yet performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

impl PlannedMove {
    /// File name of the entry, lossily converted for display.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Everything a directory listing produced.
#[derive(Debug, Default)]
pub struct DirectoryPlan {
    /// Entries to move, in listing order.
    pub moves: Vec<PlannedMove>,
    /// Entries that could not be inspected, with the reason.
    pub unreadable: Vec<(PathBuf, OrganizeError)>,
}

impl DirectoryPlan {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.unreadable.is_empty()
    }
}

/// Outcome of one organize run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Moves computed for the run. Populated for dry runs only.
    pub planned: Vec<PlannedMove>,
    /// Moves that completed, in the order they happened.
    pub moved: Vec<MoveRecord>,
    /// Entries that could not be inspected or moved, with the reason.
    pub failures: Vec<(PathBuf, OrganizeError)>,
    /// Records inherited from an earlier run that was never undone.
    pub previous_records: usize,
    /// Set when the sidecar could not be written after moving files.
    pub history_error: Option<OrganizeError>,
}

impl OrganizeReport {
    /// True when at least one move happened and the sidecar holds it.
    pub fn history_saved(&self) -> bool {
        !self.moved.is_empty() && self.history_error.is_none()
    }

    /// The log of this run's moves.
    pub fn move_log(&self) -> MoveLog {
        let mut log = MoveLog::new();
        for record in &self.moved {
            log.push(record.clone());
        }
        log
    }
}

/// Sorts the top-level files of a directory using a category table.
pub struct Organizer {
    table: CategoryTable,
}

impl Organizer {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Plans, and unless `simulate` is set, performs the organization.
    ///
    /// In simulate mode nothing on disk changes and the plan is returned in
    /// [`OrganizeReport::planned`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_category::CategoryTable;
    /// use dirsort::file_organizer::Organizer;
    /// use std::path::Path;
    ///
    /// let organizer = Organizer::new(CategoryTable::default());
    /// let report = organizer.organize(Path::new("/home/me/Downloads"), false).unwrap();
    /// println!("moved {} files", report.moved.len());
    /// ```
    pub fn organize(&self, directory: &Path, simulate: bool) -> OrganizeResult<OrganizeReport> {
        let plan = self.plan(directory)?;
        if simulate {
            return Ok(OrganizeReport {
                planned: plan.moves,
                failures: plan.unreadable,
                ..OrganizeReport::default()
            });
        }
        self.execute(directory, plan, |_, _| {})
    }

    /// Lists the entries directly inside `directory` and computes where
    /// each one belongs. Touches nothing.
    ///
    /// Directories, including symlinks to directories, and the undo
    /// sidecar are skipped. Every other entry is planned, so a symlink to
    /// a file is moved as a link.
    pub fn plan(&self, directory: &Path) -> OrganizeResult<DirectoryPlan> {
        let entries = fs::read_dir(directory).map_err(|e| OrganizeError::DirectoryNotFound {
            path: directory.to_path_buf(),
            source: e,
        })?;

        let mut plan = DirectoryPlan::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    plan.unreadable.push((
                        directory.to_path_buf(),
                        OrganizeError::EntryUnreadable {
                            path: directory.to_path_buf(),
                            source: e,
                        },
                    ));
                    continue;
                }
            };

            let name = entry.file_name();
            if name == SIDECAR_FILE_NAME {
                continue;
            }

            let source = entry.path();
            match Self::is_directory(&source) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    plan.unreadable.push((
                        source.clone(),
                        OrganizeError::EntryUnreadable { path: source, source: e },
                    ));
                    continue;
                }
            }

            let category = self.table.classify(&name.to_string_lossy());
            let destination = directory.join(category.dir_name()).join(&name);
            plan.moves.push(PlannedMove {
                source,
                destination,
                category,
            });
        }
        Ok(plan)
    }

    /// Follows symlinks; a dangling link counts as a file.
    fn is_directory(path: &Path) -> std::io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) => match fs::symlink_metadata(path) {
                Ok(link) if link.file_type().is_symlink() => Ok(false),
                _ => Err(e),
            },
        }
    }

    /// Performs `plan`, calling `on_entry` after each attempted move.
    ///
    /// A malformed sidecar left by an earlier run aborts before anything
    /// moves. Otherwise each entry fails or succeeds on its own, and when
    /// any file moved, this run's records are appended to the earlier log
    /// and the sidecar is rewritten.
    pub fn execute<F>(
        &self,
        directory: &Path,
        plan: DirectoryPlan,
        mut on_entry: F,
    ) -> OrganizeResult<OrganizeReport>
    where
        F: FnMut(&PlannedMove, &OrganizeResult<MoveRecord>),
    {
        let mut log = MoveLog::load(directory)?.unwrap_or_default();
        let mut report = OrganizeReport {
            previous_records: log.len(),
            failures: plan.unreadable,
            ..OrganizeReport::default()
        };

        for planned in &plan.moves {
            let outcome = Self::move_file(planned);
            on_entry(planned, &outcome);
            match outcome {
                Ok(record) => report.moved.push(record),
                Err(e) => report.failures.push((planned.source.clone(), e)),
            }
        }

        if !report.moved.is_empty() {
            log.extend(report.move_log());
            if let Err(e) = log.save(directory) {
                report.history_error = Some(e);
            }
        }

        Ok(report)
    }

    /// Moves a single entry to its planned destination.
    ///
    /// The category folder is created when missing, and the returned
    /// record says so. An occupied destination is refused rather than
    /// overwritten.
    pub fn move_file(planned: &PlannedMove) -> OrganizeResult<MoveRecord> {
        let mut created_dir = false;
        if let Some(category_path) = planned.destination.parent()
            && !category_path.is_dir()
        {
            fs::create_dir_all(category_path).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_path.to_path_buf(),
                    source: e,
                }
            })?;
            created_dir = true;
        }

        // symlink_metadata so a dangling link at the destination also counts
        if fs::symlink_metadata(&planned.destination).is_ok() {
            return Err(OrganizeError::DestinationExists {
                path: planned.destination.clone(),
            });
        }

        if let Err(e) = fs::rename(&planned.source, &planned.destination) {
            // no record will claim the folder, so undo could not remove it
            if created_dir && let Some(category_path) = planned.destination.parent() {
                let _ = fs::remove_dir(category_path);
            }
            return Err(OrganizeError::FileMoveFailure {
                source: planned.source.clone(),
                destination: planned.destination.clone(),
                source_error: e,
            });
        }

        let mut record = MoveRecord::new(planned.source.clone(), planned.destination.clone());
        record.created_dir = created_dir;
        Ok(record)
    }
}
