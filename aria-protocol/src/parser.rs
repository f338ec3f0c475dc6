//! Byte-fed command parser combining the framer and the grammars.

use crate::command::{self, CommandFrame};
use crate::frame::{FrameError, FrameKind, Framer};

/// Streaming parser for the serial command protocol
///
/// Feed it bytes as they arrive; it yields at most one command per byte and
/// is ready for the next frame after every success or failure.
#[derive(Debug, Clone)]
pub struct CommandParser {
    framer: Framer,
    joint_count: usize,
    last_truncated: bool,
}

impl CommandParser {
    /// Create a parser for an arm with `joint_count` joints
    pub const fn new(joint_count: usize) -> Self {
        Self {
            framer: Framer::new(),
            joint_count,
            last_truncated: false,
        }
    }

    /// Number of angle fields a bracketed frame must carry
    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    /// Whether the most recently completed frame overflowed the buffer
    ///
    /// Holds for both decoded and rejected frames.
    pub fn last_truncated(&self) -> bool {
        self.last_truncated
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.framer.reset();
        self.last_truncated = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(command))` when a command completes, `Ok(None)` when
    /// more bytes are needed or a blank line was skipped, or `Err` when the
    /// completed frame could not be decoded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<CommandFrame>, FrameError> {
        let frame = match self.framer.feed(byte) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.last_truncated = false;
                return Err(e);
            }
        };
        self.last_truncated = frame.truncated;

        let text = frame.as_str()?;
        match frame.kind {
            FrameKind::Bracketed => command::parse_bracketed(text, self.joint_count).map(Some),
            FrameKind::Line => command::parse_line(text),
        }
    }

    /// Feed multiple bytes, returning the first command or error found
    ///
    /// Also returns how many bytes were consumed; bytes after the one that
    /// completed a frame are left for the next call.
    pub fn feed_bytes(&mut self, data: &[u8]) -> (usize, Result<Option<CommandFrame>, FrameError>) {
        for (i, &byte) in data.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => continue,
                other => return (i + 1, other),
            }
        }
        (data.len(), Ok(None))
    }
}
