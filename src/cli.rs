//! Command-line arguments and the configuration resolved from them.

use std::path::PathBuf;

use clap::Parser;

/// Default data directory, relative to the working directory
const DEFAULT_DIR: &str = "tabledb_data";
/// History file name inside the data directory
const HISTORY_FILE: &str = ".tabledb_history";

/// tabledb shell
#[derive(Parser, Debug)]
#[command(
    name = "tabledb",
    version,
    about = "A small persistent table store with a SQL-like shell"
)]
pub struct Args {
    /// Data directory holding the catalog and table files
    #[arg(short = 'd', long, env = "TABLEDB_DIR", default_value = DEFAULT_DIR)]
    pub dir: PathBuf,

    /// Command history file (defaults to a file inside the data directory)
    #[arg(long, env = "TABLEDB_HISTORY", value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Execute commands from a file, one per line, and exit
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the execution time of every command
    #[arg(short = 't', long)]
    pub timing: bool,

    /// Do not ask for confirmation before DROP TABLE or DELETE without WHERE
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Keep everything in memory, nothing is written to the data directory
    #[arg(long)]
    pub memory: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Suppress the banner
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Shell configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub history_file: PathBuf,
    pub timing: bool,
    pub assume_yes: bool,
    pub in_memory: bool,
    pub quiet: bool,
}

impl From<&Args> for CliConfig {
    fn from(args: &Args) -> Self {
        Self {
            data_dir: args.dir.clone(),
            history_file: args
                .history
                .clone()
                .unwrap_or_else(|| args.dir.join(HISTORY_FILE)),
            timing: args.timing,
            assume_yes: args.yes,
            in_memory: args.memory,
            quiet: args.quiet,
        }
    }
}
