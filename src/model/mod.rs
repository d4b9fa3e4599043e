//! Domain model types (pure).

pub mod error;
pub mod message;

// Re-export for convenience
pub use error::{AliasError, AppError, ScanSkip, WatchError};
pub use message::{
    base_name, is_message_name, Identity, MessageFile, RenderedMessage, MESSAGE_SIGIL,
    ROOM_SIGIL, SENDER_SIGIL,
};
