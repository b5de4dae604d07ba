//! dirsort - sort the files of a directory into category folders
//!
//! Files are classified by extension through an immutable
//! [`CategoryTable`], moved into one subfolder per category, and every move
//! is recorded in a sidecar log so the run can be undone.

pub mod cli;
pub mod file_category;
pub mod file_organizer;
pub mod move_log;
pub mod output;
pub mod undo;

pub use file_category::{Category, CategoryTable};
pub use file_organizer::{
    DirectoryPlan, OrganizeError, OrganizeReport, OrganizeResult, Organizer, PlannedMove,
};
pub use move_log::{MoveLog, MoveRecord, SIDECAR_FILE_NAME};
pub use undo::{UndoManager, UndoReport};

pub use cli::{OrganizeCommand, run_cli};
