//! Byte-level framing for the serial command protocol.
//!
//! Two frame shapes share one byte stream:
//! - Bracketed: START (`<`), payload, END (`>`). A START byte always
//!   restarts framing, discarding anything half-received.
//! - Line: any other printable start byte, terminated by `\n` or `\r`.
//!
//! The receive buffer holds [`FRAME_CAPACITY`] bytes including the
//! terminator slot. A bracketed payload longer than that saturates: the
//! first [`MAX_FRAME_LEN`] bytes are kept, every later byte up to the end
//! marker is discarded and the frame is flagged as truncated. An over-long
//! line is dropped at its terminator.

use core::fmt;

use heapless::Vec;

/// Bracketed frame start byte
pub const START_MARKER: u8 = b'<';

/// Bracketed frame end byte
pub const END_MARKER: u8 = b'>';

/// Receive buffer size, including the terminator slot
pub const FRAME_CAPACITY: usize = 64;

/// Maximum number of payload bytes kept per frame
pub const MAX_FRAME_LEN: usize = FRAME_CAPACITY - 1;

/// Errors raised while framing or decoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Wrong number of comma-separated fields
    FieldCount { expected: u8, found: u8 },
    /// Field (0-based) is not a finite number
    InvalidNumber { field: u8 },
    /// Token letter requires a value but none was given
    MissingValue,
    /// Leading byte does not select any grammar
    UnknownCommand,
    /// Line exceeded the receive buffer and was discarded
    LineOverrun,
    /// Payload is not valid UTF-8
    NotAscii,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::FieldCount { expected, found } => {
                write!(f, "expected {} fields, got {}", expected, found)
            }
            FrameError::InvalidNumber { field } => write!(f, "invalid number in field {}", field),
            FrameError::MissingValue => f.write_str("missing value"),
            FrameError::UnknownCommand => f.write_str("unknown command"),
            FrameError::LineOverrun => f.write_str("line too long"),
            FrameError::NotAscii => f.write_str("non-ascii input"),
        }
    }
}

/// Shape of a completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Delimited by `<` and `>`
    Bracketed,
    /// Terminated by a line ending
    Line,
}

/// A completed frame, markers and terminator stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub bytes: Vec<u8, MAX_FRAME_LEN>,
    /// Payload overflowed the buffer and lost bytes
    pub truncated: bool,
}

impl Frame {
    /// Payload as text
    pub fn as_str(&self) -> Result<&str, FrameError> {
        core::str::from_utf8(&self.bytes).map_err(|_| FrameError::NotAscii)
    }
}

/// State machine splitting the serial stream into frames
#[derive(Debug, Clone)]
pub struct Framer {
    state: FramerState,
    buffer: Vec<u8, MAX_FRAME_LEN>,
    truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    /// Between frames
    Idle,
    /// Inside `<...>`
    Bracketed,
    /// Collecting a line
    Line,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    /// Create a new framer
    pub const fn new() -> Self {
        Self {
            state: FramerState::Idle,
            buffer: Vec::new(),
            truncated: false,
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = FramerState::Idle;
        self.buffer.clear();
        self.truncated = false;
    }

    /// True while a frame is partially received
    #[cfg(test)]
    fn in_progress(&self) -> bool {
        self.state != FramerState::Idle
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when a frame completes, `Ok(None)` when
    /// more bytes are needed, or `Err` when a line had to be discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        if byte == START_MARKER {
            self.reset();
            self.state = FramerState::Bracketed;
            return Ok(None);
        }

        match self.state {
            FramerState::Idle => {
                match byte {
                    // Blank lines and stray end markers carry nothing
                    b'\n' | b'\r' | END_MARKER => {}
                    _ => {
                        self.state = FramerState::Line;
                        self.store(byte);
                    }
                }
                Ok(None)
            }
            FramerState::Bracketed => {
                if byte == END_MARKER {
                    Ok(Some(self.finish(FrameKind::Bracketed)))
                } else {
                    self.store(byte);
                    Ok(None)
                }
            }
            FramerState::Line => match byte {
                b'\n' | b'\r' => {
                    if self.truncated {
                        self.reset();
                        Err(FrameError::LineOverrun)
                    } else {
                        Ok(Some(self.finish(FrameKind::Line)))
                    }
                }
                _ => {
                    self.store(byte);
                    Ok(None)
                }
            },
        }
    }

    /// Store a payload byte, discarding it once the buffer is full
    fn store(&mut self, byte: u8) {
        if self.buffer.push(byte).is_err() {
            self.truncated = true;
        }
    }

    fn finish(&mut self, kind: FrameKind) -> Frame {
        let frame = Frame {
            kind,
            bytes: core::mem::take(&mut self.buffer),
            truncated: self.truncated,
        };
        self.reset();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(framer: &mut Framer, bytes: &[u8]) -> Option<Result<Frame, FrameError>> {
        let mut last = None;
        for &b in bytes {
            match framer.feed(b) {
                Ok(Some(frame)) => last = Some(Ok(frame)),
                Ok(None) => {}
                Err(e) => last = Some(Err(e)),
            }
        }
        last
    }

    #[test]
    fn test_bracketed_frame() {
        let mut framer = Framer::new();
        let frame = feed_all(&mut framer, b"<45,90,2000>").unwrap().unwrap();
        assert_eq!(frame.kind, FrameKind::Bracketed);
        assert_eq!(frame.as_str().unwrap(), "45,90,2000");
        assert!(!frame.truncated);
        assert!(!framer.in_progress());
    }

    #[test]
    fn test_start_marker_restarts_frame() {
        let mut framer = Framer::new();
        let frame = feed_all(&mut framer, b"<1,2,<3,4>").unwrap().unwrap();
        assert_eq!(frame.as_str().unwrap(), "3,4");
    }

    #[test]
    fn test_start_marker_discards_partial_line() {
        let mut framer = Framer::new();
        let frame = feed_all(&mut framer, b"S4<1,2>").unwrap().unwrap();
        assert_eq!(frame.kind, FrameKind::Bracketed);
        assert_eq!(frame.as_str().unwrap(), "1,2");
    }

    #[test]
    fn test_bracketed_overflow_saturates() {
        let mut framer = Framer::new();
        let mut input = [b'a'; 102];
        input[0] = START_MARKER;
        input[100] = b'z';
        input[101] = END_MARKER;

        let frame = feed_all(&mut framer, &input).unwrap().unwrap();
        assert_eq!(frame.bytes.len(), MAX_FRAME_LEN);
        assert!(frame.truncated);
        assert!(frame.bytes.iter().all(|&b| b == b'a'));
    }

    #[test]
    fn test_overflow_keeps_leading_bytes() {
        let mut framer = Framer::new();
        framer.feed(START_MARKER).unwrap();
        for i in 0..MAX_FRAME_LEN {
            framer.feed(b'0' + (i % 10) as u8).unwrap();
        }
        framer.feed(b'Z').unwrap();
        let frame = framer.feed(END_MARKER).unwrap().unwrap();

        assert!(frame.truncated);
        assert_eq!(frame.bytes.len(), MAX_FRAME_LEN);
        let last = b'0' + ((MAX_FRAME_LEN - 1) % 10) as u8;
        assert_eq!(frame.bytes[MAX_FRAME_LEN - 1], last);
        assert!(!frame.bytes.contains(&b'Z'));
    }

    #[test]
    fn test_exactly_full_frame_is_not_truncated() {
        let mut framer = Framer::new();
        framer.feed(START_MARKER).unwrap();
        for _ in 0..MAX_FRAME_LEN {
            framer.feed(b'1').unwrap();
        }
        let frame = framer.feed(END_MARKER).unwrap().unwrap();
        assert_eq!(frame.bytes.len(), MAX_FRAME_LEN);
        assert!(!frame.truncated);
    }

    #[test]
    fn test_line_frame() {
        let mut framer = Framer::new();
        let frame = feed_all(&mut framer, b"B-200\n").unwrap().unwrap();
        assert_eq!(frame.kind, FrameKind::Line);
        assert_eq!(frame.as_str().unwrap(), "B-200");
    }

    #[test]
    fn test_crlf_yields_single_frame() {
        let mut framer = Framer::new();
        let mut frames = 0;
        for &b in b"H\r\nH\r\n" {
            if let Ok(Some(_)) = framer.feed(b) {
                frames += 1;
            }
        }
        assert_eq!(frames, 2);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let mut framer = Framer::new();
        assert!(feed_all(&mut framer, b"\n\r\n\n").is_none());
        assert!(!framer.in_progress());
    }

    #[test]
    fn test_stray_end_marker_ignored() {
        let mut framer = Framer::new();
        assert!(feed_all(&mut framer, b">>").is_none());
        assert!(!framer.in_progress());
    }

    #[test]
    fn test_line_overrun() {
        let mut framer = Framer::new();
        for _ in 0..FRAME_CAPACITY + 10 {
            assert_eq!(framer.feed(b'9'), Ok(None));
        }
        assert_eq!(framer.feed(b'\n'), Err(FrameError::LineOverrun));
        assert!(!framer.in_progress());

        // Parser recovers for the next line
        let frame = feed_all(&mut framer, b"H\n").unwrap().unwrap();
        assert_eq!(frame.as_str().unwrap(), "H");
    }

    #[test]
    fn test_non_utf8_payload() {
        let mut framer = Framer::new();
        let frame = feed_all(&mut framer, &[START_MARKER, 0xFF, 0xFE, END_MARKER])
            .unwrap()
            .unwrap();
        assert_eq!(frame.as_str(), Err(FrameError::NotAscii));
    }
}
