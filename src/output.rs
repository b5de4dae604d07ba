//! Console output.
//!
//! Every message the CLI prints goes through [`OutputFormatter`], which
//! owns the colors, symbols, progress bar and summary table.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Styled console output for the CLI.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green check mark line.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red cross line, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// A progress bar over `total` entries.
    ///
    /// Print per-entry lines with [`OutputFormatter::entry_line`] so they
    /// land above the bar, or on plain stdout when the bar is hidden.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints a per-entry line, routed through `pb` when it is visible.
    pub fn entry_line(pb: &ProgressBar, line: &str) {
        if pb.is_hidden() {
            println!("{}", line);
        } else {
            pb.println(line);
        }
    }

    /// Formats a successful move line: `photo.JPG -> Images/`.
    pub fn moved_line(file_name: &str, category: &str) -> String {
        format!("{} Moved: {} -> {}/", "✓".green(), file_name, category)
    }

    /// Formats a failed entry line.
    pub fn failed_line(file_name: &str, reason: &str) -> String {
        format!("{} Failed to move {}: {}", "✗".red(), file_name, reason)
    }

    /// Prints file counts per category, sorted by category name.
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
