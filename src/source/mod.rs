//! Message sources.
//!
//! This module provides the two ways messages reach the engine:
//! - [`scan`]: one-shot recursive walk of the storage tree at startup
//! - [`watch`]: live filesystem notifications for files created or moved in afterwards
//!
//! Both only *discover* files. Deciding whether a file gets displayed is the
//! engine's job.

use std::path::PathBuf;

pub mod scan;
pub mod watch;

pub use scan::{collect_chronological, scan};
pub use watch::{notifications_from_event, DirectoryWatcher};

/// What happened to a path, as far as the live merger cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A new file or directory appeared, including one renamed into the tree.
    Created,
    /// Anything else (writes, removals, renames away, metadata changes).
    Other,
}

/// One filesystem change for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind of change.
    pub kind: NotificationKind,
    /// Affected path.
    pub path: PathBuf,
}

impl Notification {
    /// A creation notification for `path`.
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: NotificationKind::Created,
            path: path.into(),
        }
    }

    /// A notification the live merger ignores.
    pub fn other(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: NotificationKind::Other,
            path: path.into(),
        }
    }
}

/// Item carried on the live channel.
///
/// The watcher only ever sends `Notification`. `Shutdown` lets a caller stop
/// the live loop deterministically; dropping every sender has the same effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveMessage {
    /// A filesystem change.
    Notification(Notification),
    /// Stop the live loop.
    Shutdown,
}

impl From<Notification> for LiveMessage {
    fn from(notification: Notification) -> Self {
        LiveMessage::Notification(notification)
    }
}
