//! Transcript line rendering.

use crate::model::RenderedMessage;
use chrono::{DateTime, Local};
use std::io::{self, Write};

/// Escape sequence starting emphasis for other people's messages.
pub const EMPHASIS_START: &str = "\x1b[1m";

/// Escape sequence resetting all attributes.
pub const EMPHASIS_END: &str = "\x1b[0m";

/// Writes messages as transcript lines, inserting a header on each room change.
#[derive(Debug, Clone)]
pub struct TranscriptFormatter {
    time_format: String,
    self_identity: String,
    last_room: String,
}

impl TranscriptFormatter {
    /// `time_format` is a strftime pattern and must already be validated
    /// (see [`validate_time_format`](crate::config::validate_time_format)).
    pub fn new(time_format: impl Into<String>, self_identity: impl Into<String>) -> Self {
        Self {
            time_format: time_format.into(),
            self_identity: self_identity.into(),
            last_room: String::new(),
        }
    }

    /// Room of the most recently written message ("" before the first).
    pub fn last_room(&self) -> &str {
        &self.last_room
    }

    /// Write one message, preceded by `"\n{room}\n"` if the room changed.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_message<W: Write>(&mut self, out: &mut W, message: &RenderedMessage) -> io::Result<()> {
        let room = &message.identity.room;
        if *room != self.last_room {
            write!(out, "\n{}\n", room)?;
            self.last_room.clone_from(room);
        }

        let time = DateTime::<Local>::from(message.timestamp).format(&self.time_format);

        if message.identity.sender == self.self_identity {
            writeln!(out, "{}{}", time, message.body)
        } else {
            writeln!(out, "{}{}{}{}", time, EMPHASIS_START, message.body, EMPHASIS_END)
        }
    }
}
