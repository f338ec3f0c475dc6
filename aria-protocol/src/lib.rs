//! A.R.I.A. Serial Command Protocol
//!
//! This crate defines the ASCII protocol spoken between a host (terminal,
//! script or voice front-end) and the arm controller over a serial link.
//!
//! # Protocol Overview
//!
//! One parser accepts three grammars, selected by the leading byte:
//! ```text
//! <45,90,45,90,90,0,2000>   bracketed full pose, last field is the duration in ms
//! 90,45,90,90,1\n           CSV line: shoulder, elbow, wrist roll, wrist pitch, gripper
//! S90\n  B-200\n  H\n       single-letter tokens with an optional signed integer
//! ```
//!
//! Every accepted or rejected frame produces one or more [`Reply`] lines
//! going back to the host.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod parser;
pub mod reply;

pub use command::{Axis, CommandFrame, GripperField};
pub use frame::{Frame, FrameError, FrameKind, Framer, END_MARKER, FRAME_CAPACITY, START_MARKER};
pub use parser::CommandParser;
pub use reply::{Reply, REPLY_LINE_LEN};

/// Maximum number of joints a bracketed frame can address
pub const MAX_JOINTS: usize = 8;
