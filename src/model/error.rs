//! Error types for mmview.
//!
//! This module defines the error taxonomy using `thiserror`. Errors fall into
//! two tiers that never mix:
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Fatal startup failures. Logged, then the process exits with status 1.
//!   - [`ConfigError`] - Config file unreadable or malformed, bad time format
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing subscriber setup
//!   - [`WatchError`] - The recursive filesystem watch could not be started
//!   - `std::io::Error` - Standard output went away
//! - Recoverable, per-item failures. Logged and skipped; they never reach `main`.
//!   - [`ScanSkip`] - One entry of the initial directory walk could not be used
//!   - [`AliasError`] - An alias table could not be loaded (an empty table is substituted)
//!
//! Alias lookup misses and timestamp collisions are not errors at all: they
//! degrade to the raw token and to omission respectively.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::logging::LoggingError;

/// Top-level application error encompassing all fatal failure modes.
///
/// Only initialization can produce one of these. Once the live loop is
/// running, per-file problems are logged and dropped, so the only way out of
/// the loop with an error is a broken standard output.
#[derive(Debug, Error)]
pub enum AppError {
    /// The current user's home directory could not be determined.
    ///
    /// Both default storage locations hang off the home directory, so without
    /// it there is nothing to read unless both `-d` and `-c` are given.
    #[error("Unable to determine the current user's home directory")]
    NoHomeDirectory,

    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Diagnostics could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The filesystem watch on the data directory could not be started.
    #[error("Failed to watch data directory for new messages: {0}")]
    Watch(#[from] WatchError),

    /// Writing the transcript to standard output failed.
    ///
    /// **Recovery**: none. The reader is gone (closed pipe, dead terminal).
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors starting the live filesystem watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The platform watch backend could not be created (e.g. inotify limit reached).
    #[error("Failed to initialize filesystem watcher: {0}")]
    Init(#[source] notify::Error),

    /// The backend exists but refused to watch the storage root.
    ///
    /// **When this occurs**: the data directory does not exist, or is not
    /// readable by the current user.
    #[error("Failed to watch {path}: {source}")]
    Watch {
        /// Root that was passed to the watcher.
        path: PathBuf,
        /// Underlying notify error.
        #[source]
        source: notify::Error,
    },
}

/// Reasons a single alias table could not be loaded.
///
/// Never fatal: [`AliasTable::load_or_empty`](crate::config::AliasTable::load_or_empty)
/// logs the error and substitutes an empty table.
#[derive(Debug, Error)]
pub enum AliasError {
    /// The alias file could not be read (commonly: it does not exist).
    #[error("Failed to read mapping {path}: {source}")]
    Read {
        /// Alias file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The alias file is not a JSON object of strings.
    #[error("Failed to parse mapping {path}: {source}")]
    Parse {
        /// Alias file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// A directory-walk entry that was skipped during the initial scan.
///
/// The scanner yields these inline with discovered files instead of logging
/// them itself; the caller decides what to do (it logs and moves on).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanSkip {
    /// The walker could not descend into or list an entry.
    #[error("Failed to walk {path}: {reason}")]
    Walk {
        /// Offending path (the walk root when the walker could not tell).
        path: PathBuf,
        /// Reason reported by the walker.
        reason: String,
    },

    /// A candidate message file vanished or could not be stat'ed.
    #[error("Failed to stat message file {path}: {reason}")]
    Metadata {
        /// Message file path.
        path: PathBuf,
        /// Reason reported by the OS.
        reason: String,
    },
}

impl ScanSkip {
    /// Path the skip refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ScanSkip::Walk { path, .. } | ScanSkip::Metadata { path, .. } => path,
        }
    }
}
