//! tabledb shell
//!
//! ```bash
//! # Interactive shell on ./tabledb_data
//! tabledb
//!
//! # One command against another directory
//! tabledb -d /var/lib/tabledb -c "SELECT * FROM users"
//!
//! # Run a script without confirmation prompts
//! tabledb -y -f setup.sql
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tabledb::{
    sql::engine::Session,
    storage::{disk::DiskStorage, engine::Storage, memory::MemoryStorage},
};

mod cli;
mod formatter;
mod repl;

use cli::{Args, CliConfig};
use repl::Shell;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = CliConfig::from(&args);

    if config.in_memory {
        start(Session::open(MemoryStorage::new())?, config, &args)
    } else {
        let storage = DiskStorage::new(&config.data_dir);
        info!(dir = %storage.dir().display(), "opening data directory");
        let session = Session::open(storage).with_context(|| {
            format!("failed to load {}", config.data_dir.display())
        })?;
        start(session, config, &args)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tabledb=debug")
    } else {
        EnvFilter::new("tabledb=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn start<S: Storage + 'static>(session: Session<S>, config: CliConfig, args: &Args) -> Result<()> {
    let quiet = config.quiet;
    let mut shell = Shell::new(session, config);

    if let Some(command) = &args.command {
        info!("Executing command: {}", command);
        shell.run_script(command);
        Ok(())
    } else if let Some(file) = &args.file {
        info!("Executing file: {}", file.display());
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        shell.run_script(&content);
        Ok(())
    } else {
        if !quiet {
            shell.print_banner();
        }
        shell.run_interactive()
    }
}
