//! Message file and display identity types.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Leading character of a message file's base name.
pub const MESSAGE_SIGIL: char = '$';

/// Leading character of the path segment naming the room.
pub const ROOM_SIGIL: char = '!';

/// Leading character of the path segment naming the sender.
pub const SENDER_SIGIL: char = '@';

/// A message file discovered on disk: where it lives and when it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFile {
    /// Location of the file.
    pub path: PathBuf,
    /// Last modification time; orders and (by default) deduplicates messages.
    pub modified: SystemTime,
}

impl MessageFile {
    /// Create a message file record.
    pub fn new(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }
}

/// Whether a base name marks a message file.
pub fn is_message_name(name: &str) -> bool {
    name.starts_with(MESSAGE_SIGIL)
}

/// Base name of `path` as UTF-8, if it has one.
pub fn base_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Display identity of a message, after alias expansion.
///
/// Either field is empty when the path carries no matching token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Room display name.
    pub room: String,
    /// Sender display name.
    pub sender: String,
}

/// Everything the formatter needs to print one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Resolved room and sender.
    pub identity: Identity,
    /// File modification time, shown in local time.
    pub timestamp: SystemTime,
    /// Whitespace-trimmed file content.
    pub body: String,
}
