//! Tracing subscriber initialization.
//!
//! Standard output carries the transcript, so diagnostics go either to a log
//! file (when one is configured) or to standard error.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Default level on standard error, which shares the terminal with the transcript.
const STDERR_DEFAULT_LEVEL: &str = "warn";

/// Default level when logging to a file.
const FILE_DEFAULT_LEVEL: &str = "info";

fn default_level(log_path: Option<&Path>) -> &'static str {
    match log_path {
        Some(_) => FILE_DEFAULT_LEVEL,
        None => STDERR_DEFAULT_LEVEL,
    }
}

/// Respect RUST_LOG, otherwise use `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize the tracing subscriber.
///
/// With `Some(path)`, logs at `info` and above are appended to that file (its
/// directory is created if needed). With `None`, only warnings and errors go
/// to standard error. `RUST_LOG` overrides either default.
///
/// # Errors
///
/// Returns `LoggingError` if the subscriber was already initialized or the
/// log file location is unusable.
pub fn init(log_path: Option<&Path>) -> Result<(), LoggingError> {
    match log_path {
        Some(path) => init_file(path),
        None => tracing_subscriber::fmt()
            .with_env_filter(env_filter(default_level(None)))
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|_| LoggingError::SubscriberAlreadySet),
    }
}

fn init_file(log_path: &Path) -> Result<(), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;

    // A bare file name has an empty parent: log next to the working directory.
    let directory = if directory.as_os_str().is_empty() {
        Path::new(".")
    } else {
        directory
    };

    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level(Some(log_path))))
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI colors in log files
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}
