use clap::Parser;
use dirsort::cli::{OrganizeCommand, resolve_directory, run_cli};
use dirsort::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Sort the files of a directory into category folders by extension.
#[derive(Parser)]
#[command(name = "dirsort")]
#[command(version, about)]
struct Cli {
    /// Directory to organize (default: current directory, `~` is expanded)
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Show what would be moved without touching anything
    #[arg(long, conflicts_with = "undo")]
    dry_run: bool,

    /// Revert the last organization of the directory
    #[arg(long)]
    undo: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let dir = match resolve_directory(&cli.dir) {
        Ok(dir) => dir,
        Err(e) => {
            OutputFormatter::error(&e);
            return ExitCode::FAILURE;
        }
    };

    let command = if cli.undo {
        OrganizeCommand::Undo
    } else {
        OrganizeCommand::Organize {
            dry_run: cli.dry_run,
        }
    };

    match run_cli(command, &dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
