//! mmview - Entry Point

use clap::Parser;
use mmview::config::{self, CliOverrides};
use mmview::engine::{run_live, DedupKey, IngestEngine};
use mmview::model::AppError;
use mmview::source::DirectoryWatcher;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// mmview - chronological transcript of a directory-per-message chat store
#[derive(Parser, Debug)]
#[command(name = "mmview")]
#[command(version)]
#[command(about = "Print a chat transcript from a message directory tree and follow new messages")]
pub struct Args {
    /// Data storage directory
    #[arg(short = 'd', long = "data", value_name = "DIR")]
    pub data: Option<PathBuf>,

    /// Config directory (rooms.json, accounts.json, config.toml)
    #[arg(short = 'c', long = "config", value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Time format (strftime pattern)
    #[arg(short = 'f', long = "format", value_name = "PATTERN")]
    pub format: Option<String>,

    /// What identifies an already displayed message
    #[arg(long, value_enum, value_name = "KEY")]
    pub dedup_key: Option<DedupKey>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            time_format: self.format.clone(),
            dedup_key: self.dedup_key,
            log_file_path: self.log_file.clone(),
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let home = dirs::home_dir();
    let dirs = config::resolve_storage_dirs(args.data.clone(), args.config.clone(), home.as_deref())
        .ok_or(AppError::NoHomeDirectory)?;

    // Defaults → config.toml → env vars → CLI args
    let config = config::resolve(dirs, args.overrides())?;

    mmview::logging::init(config.log_file_path.as_deref())?;

    info!(config = ?config, "Configuration loaded and resolved");

    let mut engine = IngestEngine::from_config(&config);

    // Watch before scanning so nothing written during the scan is lost;
    // anything seen twice is caught by the seen-set.
    let (_watcher, rx) = DirectoryWatcher::start(&config.data_dir)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    engine.replay(&config.data_dir, &mut out)?;

    let exit = run_live(&mut engine, &rx, &mut out)?;
    info!(?exit, "Live watch ended");

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "Fatal error");
            eprintln!("mmview: {}", error);
            ExitCode::FAILURE
        }
    }
}
