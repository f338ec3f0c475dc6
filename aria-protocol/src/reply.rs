//! Outgoing reply lines.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::frame::FrameError;
use crate::MAX_JOINTS;

/// Capacity of one rendered reply line, line ending included
pub const REPLY_LINE_LEN: usize = 128;

/// A line sent back to the host
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Boot banner
    Online,
    /// Bracketed frame layout for this arm
    Protocol { joints: u8 },
    /// Eased move armed (clamped targets, effective duration)
    MovingTo {
        targets: Vec<f32, MAX_JOINTS>,
        duration_ms: u32,
    },
    /// Eased move reached its targets
    Done,
    /// Home move armed
    Homing { duration_ms: u32 },
    /// Relative base move issued
    BaseStep { delta: i32 },
    /// Joint set immediately
    Set { joint: u8, angle: f32 },
    /// Gripper toggled
    Gripper { angle: f32 },
    /// Gripper cycle started
    GripperCycle { start: f32, closed: f32, open: f32 },
    /// Requested angle was outside the joint's bounds
    Clamped {
        joint: u8,
        requested: f32,
        applied: f32,
    },
    /// Frame overflowed the receive buffer
    Truncated,
    /// Command addressed a joint this arm does not have
    NoSuchJoint { joint: u8 },
    /// Frame was rejected
    Error(FrameError),
}

impl From<FrameError> for Reply {
    fn from(e: FrameError) -> Self {
        Reply::Error(e)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Online => f.write_str("A.R.I.A. Arm Controller Online"),
            Reply::Protocol { joints } => {
                f.write_str("Protocol: <")?;
                for j in 1..=*joints {
                    write!(f, "J{},", j)?;
                }
                f.write_str("TIME_MS>")
            }
            Reply::MovingTo {
                targets,
                duration_ms,
            } => {
                f.write_str("MOVING TO:")?;
                for t in targets {
                    write!(f, " {}", t)?;
                }
                write!(f, " {}ms", duration_ms)
            }
            Reply::Done => f.write_str("DONE"),
            Reply::Homing { duration_ms } => write!(f, "HOMING {}ms", duration_ms),
            Reply::BaseStep { delta } => write!(f, "BASE STEP {}", delta),
            Reply::Set { joint, angle } => write!(f, "SET J{} {}", u16::from(*joint) + 1, angle),
            Reply::Gripper { angle } => write!(f, "GRIPPER {}", angle),
            Reply::GripperCycle {
                start,
                closed,
                open,
            } => write!(f, "GRIPPER CYCLE {} {} {}", start, closed, open),
            Reply::Clamped {
                joint,
                requested,
                applied,
            } => write!(f, "CLAMPED J{} {} -> {}", u16::from(*joint) + 1, requested, applied),
            Reply::Truncated => f.write_str("WARN frame truncated"),
            Reply::NoSuchJoint { joint } => write!(f, "ERR no joint J{}", u16::from(*joint) + 1),
            Reply::Error(e) => write!(f, "ERR {}", e),
        }
    }
}

impl Reply {
    /// Render as a `\r\n`-terminated line
    pub fn render(&self) -> Result<String<REPLY_LINE_LEN>, fmt::Error> {
        let mut line = String::new();
        write!(line, "{}\r\n", self)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner() {
        assert_eq!(
            Reply::Online.render().unwrap().as_str(),
            "A.R.I.A. Arm Controller Online\r\n"
        );
        assert_eq!(
            Reply::Protocol { joints: 6 }.render().unwrap().as_str(),
            "Protocol: <J1,J2,J3,J4,J5,J6,TIME_MS>\r\n"
        );
    }

    #[test]
    fn test_moving_to() {
        let reply = Reply::MovingTo {
            targets: Vec::from_slice(&[45.0, 90.0, 12.5]).unwrap(),
            duration_ms: 500,
        };
        assert_eq!(reply.render().unwrap().as_str(), "MOVING TO: 45 90 12.5 500ms\r\n");
    }

    #[test]
    fn test_joint_numbers_are_one_based() {
        let reply = Reply::Clamped {
            joint: 1,
            requested: 200.0,
            applied: 180.0,
        };
        assert_eq!(reply.render().unwrap().as_str(), "CLAMPED J2 200 -> 180\r\n");
    }

    #[test]
    fn test_error_line() {
        let reply: Reply = FrameError::FieldCount {
            expected: 7,
            found: 3,
        }
        .into();
        assert_eq!(
            reply.render().unwrap().as_str(),
            "ERR expected 7 fields, got 3\r\n"
        );
    }

    #[test]
    fn test_widest_reply_fits() {
        let reply = Reply::MovingTo {
            targets: Vec::from_slice(&[-123456.79; MAX_JOINTS]).unwrap(),
            duration_ms: u32::MAX,
        };
        assert!(reply.render().is_ok());
    }
}
