//! Command orchestration for dirsort.
//!
//! Turns a parsed command into calls on the organizer or undo manager and
//! prints the outcome. Fatal problems come back as `Err(String)`; per-file
//! failures are printed and do not fail the command.

use crate::file_category::CategoryTable;
use crate::file_organizer::{OrganizeReport, Organizer};
use crate::output::OutputFormatter;
use crate::undo::{UndoManager, UndoReport};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A command to run against one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Sort files into category folders.
    Organize {
        /// Only print what would happen.
        dry_run: bool,
    },
    /// Revert the recorded moves.
    Undo,
}

/// Runs `command` on `dir_path`.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// if let Err(e) = run_cli(OrganizeCommand::Organize { dry_run: true }, Path::new("/tmp")) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<(), String> {
    match command {
        OrganizeCommand::Organize { dry_run } => {
            let organizer = Organizer::new(CategoryTable::default());
            if dry_run {
                organize_dry_run(&organizer, dir_path)
            } else {
                organize_directory(&organizer, dir_path)
            }
        }
        OrganizeCommand::Undo => undo_organization(dir_path),
    }
}

/// Expands a leading `~` and makes the path absolute.
pub fn resolve_directory(raw: &Path) -> Result<PathBuf, String> {
    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .ok_or_else(|| "Cannot expand '~': home directory not found".to_string())?
            .join(rest),
        Err(_) => raw.to_path_buf(),
    };
    std::path::absolute(&expanded)
        .map_err(|e| format!("Cannot resolve {}: {}", expanded.display(), e))
}

fn organize_directory(organizer: &Organizer, base_path: &Path) -> Result<(), String> {
    OutputFormatter::info(&format!("Organizing contents of: {}", base_path.display()));

    let plan = organizer.plan(base_path).map_err(|e| e.to_string())?;
    if plan.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    let pb = OutputFormatter::create_progress_bar(plan.moves.len() as u64);
    let report = organizer
        .execute(base_path, plan, |planned, outcome| {
            let line = match outcome {
                Ok(_) => OutputFormatter::moved_line(&planned.file_name(), planned.category.dir_name()),
                Err(e) => OutputFormatter::failed_line(&planned.file_name(), &e.to_string()),
            };
            OutputFormatter::entry_line(&pb, &line);
            pb.inc(1);
        })
        .map_err(|e| e.to_string());
    pb.finish_and_clear();
    let report = report?;

    print_organize_report(&report, base_path);
    Ok(())
}

fn print_organize_report(report: &OrganizeReport, base_path: &Path) {
    if !report.moved.is_empty() {
        let mut counts = BTreeMap::new();
        for record in &report.moved {
            let category = record
                .to
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            *counts.entry(category).or_insert(0) += 1;
        }
        OutputFormatter::summary_table(&counts, report.moved.len());
    }

    if !report.failures.is_empty() {
        OutputFormatter::header("FAILURES");
        for (path, error) in &report.failures {
            OutputFormatter::error(&format!("{}: {}", path.display(), error));
        }
    }

    if let Some(error) = &report.history_error {
        OutputFormatter::warning(&format!("Could not save undo history: {}", error));
        OutputFormatter::warning("The moves above cannot be undone automatically.");
        return;
    }

    if report.history_saved() {
        if report.previous_records > 0 {
            OutputFormatter::warning(&format!(
                "Undo history from an earlier run ({} moves) was kept; undo will revert both runs.",
                report.previous_records
            ));
        }
        OutputFormatter::success("Organization complete!");
        OutputFormatter::plain(&format!(
            "Use 'dirsort --dir {} --undo' to revert changes.",
            base_path.display()
        ));
    } else {
        OutputFormatter::warning("No files were moved.");
    }
}

fn organize_dry_run(organizer: &Organizer, base_path: &Path) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));

    let report = organizer
        .organize(base_path, true)
        .map_err(|e| e.to_string())?;

    for (path, error) in &report.failures {
        OutputFormatter::error(&format!("{}: {}", path.display(), error));
    }

    if report.planned.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    let mut counts = BTreeMap::new();
    for planned in &report.planned {
        OutputFormatter::dry_run_notice(&format!(
            "Would move: {} -> {}/",
            planned.file_name(),
            planned.category.dir_name()
        ));
        *counts
            .entry(planned.category.dir_name().to_string())
            .or_insert(0) += 1;
    }

    OutputFormatter::summary_table(&counts, report.planned.len());
    OutputFormatter::success("Dry run complete. No files were modified.");
    OutputFormatter::plain(&format!(
        "Run 'dirsort --dir {}' (without --dry-run) to organize.",
        base_path.display()
    ));
    Ok(())
}

fn undo_organization(base_path: &Path) -> Result<(), String> {
    OutputFormatter::info(&format!("Undoing organization of: {}", base_path.display()));

    let result = UndoManager::undo_with(base_path, |record, outcome| match outcome {
        Ok(()) => OutputFormatter::success(&format!(
            "Restored: {} -> {}",
            record.to.display(),
            record.from.display()
        )),
        Err(reason) => OutputFormatter::error(&format!("{}: {}", record.to.display(), reason)),
    })
    .map_err(|e| e.to_string())?;

    match result {
        Some(report) => print_undo_report(&report),
        None => OutputFormatter::plain("Nothing to undo."),
    }
    Ok(())
}

fn print_undo_report(report: &UndoReport) {
    OutputFormatter::header("UNDO SUMMARY");
    OutputFormatter::plain(&format!("  Restored: {}", report.restored_files));

    if !report.skipped_files.is_empty() {
        OutputFormatter::plain(&format!("  Skipped: {}", report.skipped_files.len()));
        for (path, reason) in &report.skipped_files {
            OutputFormatter::plain(&format!("    - {}: {}", path.display(), reason));
        }
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::plain(&format!("  Failed: {}", report.failed_restores.len()));
        for (path, reason) in &report.failed_restores {
            OutputFormatter::error(&format!("    {}: {}", path.display(), reason));
        }
    }

    for (original, backup) in &report.backed_up {
        OutputFormatter::warning(&format!(
            "{} was in the way and was kept as {}",
            original.display(),
            backup.display()
        ));
    }

    match &report.history_error {
        Some(error) => OutputFormatter::warning(&format!("Could not remove undo history: {}", error)),
        None if report.is_complete_success() => OutputFormatter::success("Undo complete!"),
        None => OutputFormatter::warning("Undo finished with problems; the undo history was consumed."),
    }
}
