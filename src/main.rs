use clap::Parser;
use filesanitizer::cli::{CliOptions, SanitizeCommand, run_cli};
use filesanitizer::logging::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

/// Rename every file in a folder to a name that is valid on Windows and POSIX.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target folder (default: current directory)
    folder: Option<PathBuf>,

    /// Substrings to remove from file names; switches to pattern-removal mode
    patterns: Vec<String>,

    /// Report what would be renamed without touching files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print info entries and enable debug diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Do not write the timestamped log file
    #[arg(long)]
    no_log_file: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(if args.verbose { "debug" } else { "warn" });

    let folder = args.folder.unwrap_or_default();
    let command = SanitizeCommand::from_patterns(&args.patterns);
    let options = CliOptions {
        dry_run: args.dry_run,
        verbose: args.verbose,
        write_log_file: !args.no_log_file,
    };

    match run_cli(&command, &folder, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
