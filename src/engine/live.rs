//! Live merge loop.
//!
//! After the initial replay, the process sits in [`run_live`] pulling
//! notifications off the watch channel. Each one is classified by
//! [`handle_notification`]:
//!
//! ```text
//! Listening ──recv──▶ not Created ─────────────▶ Ignored
//!                     name lacks '$' ──────────▶ NoSigil
//!                     stat fails / not a file ─▶ StatFailed / Ignored
//!                     offer ───────────────────▶ Duplicate | Unreadable | Displayed
//! ```
//!
//! and the loop goes back to listening. It only returns on
//! [`LiveMessage::Shutdown`] or once every sender has been dropped.

use super::{IngestEngine, Offer};
use crate::model::{base_name, MESSAGE_SIGIL};
use crate::source::{LiveMessage, Notification, NotificationKind};
use std::io::{self, Write};
use std::sync::mpsc::Receiver;
use tracing::{debug, trace, warn};

/// What happened to one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not a file creation, or the created path is not a regular file.
    Ignored,
    /// File name does not contain the message sigil.
    NoSigil,
    /// The file could not be stat'ed (it may already be gone).
    StatFailed,
    /// Already displayed.
    Duplicate,
    /// Stat succeeded but the content could not be read.
    Unreadable,
    /// Written to the output.
    Displayed,
}

impl From<Offer> for Disposition {
    fn from(offer: Offer) -> Self {
        match offer {
            Offer::Displayed => Disposition::Displayed,
            Offer::Duplicate => Disposition::Duplicate,
            Offer::Unreadable => Disposition::Unreadable,
        }
    }
}

/// Why [`run_live`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveExit {
    /// A [`LiveMessage::Shutdown`] was received.
    Shutdown,
    /// Every sender was dropped.
    Disconnected,
}

/// Process one notification.
///
/// # Errors
///
/// Only write failures on `out` are returned.
pub fn handle_notification<W: Write>(
    engine: &mut IngestEngine,
    notification: &Notification,
    out: &mut W,
) -> io::Result<Disposition> {
    if notification.kind != NotificationKind::Created {
        return Ok(Disposition::Ignored);
    }

    let path = &notification.path;
    if !base_name(path).is_some_and(|name| name.contains(MESSAGE_SIGIL)) {
        return Ok(Disposition::NoSigil);
    }

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            warn!(path = %path.display(), %error, "Failed to stat message file");
            return Ok(Disposition::StatFailed);
        }
    };
    if !metadata.is_file() {
        return Ok(Disposition::Ignored);
    }
    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(error) => {
            warn!(path = %path.display(), %error, "Failed to stat message file");
            return Ok(Disposition::StatFailed);
        }
    };

    engine.offer(path, modified, out).map(Disposition::from)
}

/// Block on `rx`, feeding each notification through the engine.
///
/// # Errors
///
/// Only write failures on `out` are returned.
pub fn run_live<W: Write>(
    engine: &mut IngestEngine,
    rx: &Receiver<LiveMessage>,
    out: &mut W,
) -> io::Result<LiveExit> {
    loop {
        let Ok(message) = rx.recv() else {
            debug!("Live channel disconnected");
            return Ok(LiveExit::Disconnected);
        };

        match message {
            LiveMessage::Shutdown => {
                debug!("Live loop shutdown requested");
                return Ok(LiveExit::Shutdown);
            }
            LiveMessage::Notification(notification) => {
                let disposition = handle_notification(engine, &notification, out)?;
                trace!(path = %notification.path.display(), ?disposition, "Handled notification");
            }
        }
    }
}

#[cfg(test)]
#[path = "live_tests.rs"]
mod tests;
