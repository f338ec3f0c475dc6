//! Command frames and the grammars that produce them.

use heapless::Vec;

use crate::frame::FrameError;
use crate::MAX_JOINTS;

/// Joint roles addressable by the CSV and token grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Axis {
    Shoulder = 1,
    Elbow = 2,
    WristRoll = 3,
    WristPitch = 4,
    Gripper = 5,
}

impl Axis {
    /// Joint index this role maps to (index 0 is the base)
    pub const fn joint(self) -> usize {
        self as usize
    }

    /// Look up the axis for a token letter
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            b'S' => Some(Axis::Shoulder),
            b'E' => Some(Axis::Elbow),
            b'R' => Some(Axis::WristRoll),
            b'P' => Some(Axis::WristPitch),
            b'G' => Some(Axis::Gripper),
            _ => None,
        }
    }
}

/// Gripper field of a CSV pose line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GripperField {
    /// Absolute gripper angle in degrees
    Angle(f32),
    /// Run the scripted close/open cycle
    Cycle,
}

/// A decoded command, consumed once by the dispatcher
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandFrame {
    /// Eased move of every joint to the given angles
    Absolute {
        targets: Vec<f32, MAX_JOINTS>,
        duration_ms: u32,
    },
    /// Immediate relative base move, in driver steps
    RelativeStep { delta: i32 },
    /// Immediate absolute set of one bounded joint
    SingleAxis { axis: Axis, angle: f32 },
    /// Immediate set of shoulder, elbow, wrist roll, wrist pitch, then the gripper
    Pose {
        angles: [f32; 4],
        gripper: GripperField,
    },
    /// Flip the gripper between its open and closed angles
    Toggle,
    /// Scripted close/open sweep of the gripper
    GripperCycle,
    /// Move to the configured home pose
    Home,
}

/// Number of fields in a CSV pose line
pub const POSE_FIELDS: usize = 5;

/// Text of the gripper field that means "cycle" rather than an angle
const CYCLE_SENTINEL: &str = "1";

/// Decode a bracketed payload: `joint_count` angles followed by a duration
pub fn parse_bracketed(text: &str, joint_count: usize) -> Result<CommandFrame, FrameError> {
    let expected = joint_count + 1;
    let found = text.split(',').count();
    if found != expected || joint_count > MAX_JOINTS {
        return Err(FrameError::FieldCount {
            expected: expected as u8,
            found: found.min(u8::MAX as usize) as u8,
        });
    }

    let mut targets = Vec::new();
    let mut duration_ms = 0;
    for (i, field) in text.split(',').enumerate() {
        let value = parse_number(field, i)?;
        if i < joint_count {
            targets
                .push(value)
                .map_err(|_| FrameError::FieldCount {
                    expected: expected as u8,
                    found: found as u8,
                })?;
        } else {
            // Float to int casts saturate; negatives land on 0
            duration_ms = value as u32;
        }
    }

    Ok(CommandFrame::Absolute {
        targets,
        duration_ms,
    })
}

/// Decode a line payload
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(text: &str) -> Result<Option<CommandFrame>, FrameError> {
    let text = text.trim();
    let Some(&lead) = text.as_bytes().first() else {
        return Ok(None);
    };

    if lead.is_ascii_alphabetic() {
        parse_token(lead, &text[1..]).map(Some)
    } else if text.contains(',') {
        parse_pose(text).map(Some)
    } else if text == CYCLE_SENTINEL {
        Ok(Some(CommandFrame::GripperCycle))
    } else {
        Err(FrameError::UnknownCommand)
    }
}

/// Letter plus optional signed integer
fn parse_token(letter: u8, rest: &str) -> Result<CommandFrame, FrameError> {
    let rest = rest.trim();
    match letter.to_ascii_uppercase() {
        b'H' => return Ok(CommandFrame::Home),
        b'T' => return Ok(CommandFrame::Toggle),
        _ => {}
    }

    if rest.is_empty() {
        // Letters that take a value still have to be known ones
        return if letter.to_ascii_uppercase() == b'B' || Axis::from_letter(letter).is_some() {
            Err(FrameError::MissingValue)
        } else {
            Err(FrameError::UnknownCommand)
        };
    }

    if letter.to_ascii_uppercase() == b'B' {
        let delta = parse_int(rest)?;
        return Ok(CommandFrame::RelativeStep { delta });
    }

    let axis = Axis::from_letter(letter).ok_or(FrameError::UnknownCommand)?;
    let angle = parse_int(rest)? as f32;
    Ok(CommandFrame::SingleAxis { axis, angle })
}

/// `shoulder,elbow,wrist_roll,wrist_pitch,gripper`
fn parse_pose(text: &str) -> Result<CommandFrame, FrameError> {
    let found = text.split(',').count();
    if found != POSE_FIELDS {
        return Err(FrameError::FieldCount {
            expected: POSE_FIELDS as u8,
            found: found.min(u8::MAX as usize) as u8,
        });
    }

    let mut fields = text.split(',');
    let mut angles = [0.0f32; 4];
    for (i, angle) in angles.iter_mut().enumerate() {
        let field = fields.next().ok_or(FrameError::InvalidNumber { field: i as u8 })?;
        *angle = parse_number(field, i)?;
    }

    let last = POSE_FIELDS - 1;
    let gripper = match fields.next() {
        Some(field) if field.trim() == CYCLE_SENTINEL => GripperField::Cycle,
        Some(field) => GripperField::Angle(parse_number(field, last)?),
        None => return Err(FrameError::InvalidNumber { field: last as u8 }),
    };

    Ok(CommandFrame::Pose { angles, gripper })
}

fn parse_number(field: &str, index: usize) -> Result<f32, FrameError> {
    let invalid = FrameError::InvalidNumber { field: index as u8 };
    let value: f32 = field.trim().parse().map_err(|_| invalid)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid)
    }
}

fn parse_int(value: &str) -> Result<i32, FrameError> {
    value
        .parse()
        .map_err(|_| FrameError::InvalidNumber { field: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bracketed() {
        let cmd = parse_bracketed("45,90,45,90,90,0,2000", 6).unwrap();
        match cmd {
            CommandFrame::Absolute {
                targets,
                duration_ms,
            } => {
                assert_eq!(targets.as_slice(), &[45.0, 90.0, 45.0, 90.0, 90.0, 0.0]);
                assert_eq!(duration_ms, 2000);
            }
            _ => panic!("Wrong command"),
        }
    }

    #[test]
    fn test_bracketed_fields_are_trimmed() {
        let cmd = parse_bracketed(" 10 , 20.5 ,300 ", 2).unwrap();
        assert_eq!(
            cmd,
            CommandFrame::Absolute {
                targets: Vec::from_slice(&[10.0, 20.5]).unwrap(),
                duration_ms: 300,
            }
        );
    }

    #[test]
    fn test_bracketed_wrong_field_count() {
        assert_eq!(
            parse_bracketed("45,90,2000", 6),
            Err(FrameError::FieldCount {
                expected: 7,
                found: 3
            })
        );
        assert_eq!(
            parse_bracketed("1,2,3,4,5,6,7,8", 6),
            Err(FrameError::FieldCount {
                expected: 7,
                found: 8
            })
        );
    }

    #[test]
    fn test_bracketed_invalid_number() {
        assert_eq!(
            parse_bracketed("45,abc,2000", 2),
            Err(FrameError::InvalidNumber { field: 1 })
        );
        assert_eq!(
            parse_bracketed("45,,2000", 2),
            Err(FrameError::InvalidNumber { field: 1 })
        );
        assert_eq!(
            parse_bracketed("45,NaN,2000", 2),
            Err(FrameError::InvalidNumber { field: 1 })
        );
    }

    #[test]
    fn test_bracketed_duration_saturates() {
        match parse_bracketed("0,-50", 1).unwrap() {
            CommandFrame::Absolute { duration_ms, .. } => assert_eq!(duration_ms, 0),
            _ => panic!("Wrong command"),
        }
        match parse_bracketed("0,1e12", 1).unwrap() {
            CommandFrame::Absolute { duration_ms, .. } => assert_eq!(duration_ms, u32::MAX),
            _ => panic!("Wrong command"),
        }
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(parse_line("H").unwrap(), Some(CommandFrame::Home));
        assert_eq!(parse_line("h").unwrap(), Some(CommandFrame::Home));
        assert_eq!(parse_line("H123").unwrap(), Some(CommandFrame::Home));
        assert_eq!(parse_line("T").unwrap(), Some(CommandFrame::Toggle));
        assert_eq!(
            parse_line("B-200").unwrap(),
            Some(CommandFrame::RelativeStep { delta: -200 })
        );
        assert_eq!(
            parse_line("b +15").unwrap(),
            Some(CommandFrame::RelativeStep { delta: 15 })
        );
        assert_eq!(
            parse_line("S90").unwrap(),
            Some(CommandFrame::SingleAxis {
                axis: Axis::Shoulder,
                angle: 90.0
            })
        );
        assert_eq!(
            parse_line("p 45").unwrap(),
            Some(CommandFrame::SingleAxis {
                axis: Axis::WristPitch,
                angle: 45.0
            })
        );
        assert_eq!(
            parse_line("G180").unwrap(),
            Some(CommandFrame::SingleAxis {
                axis: Axis::Gripper,
                angle: 180.0
            })
        );
    }

    #[test]
    fn test_token_errors() {
        assert_eq!(parse_line("S"), Err(FrameError::MissingValue));
        assert_eq!(parse_line("B"), Err(FrameError::MissingValue));
        assert_eq!(parse_line("X10"), Err(FrameError::UnknownCommand));
        assert_eq!(parse_line("X"), Err(FrameError::UnknownCommand));
        assert_eq!(
            parse_line("E4.5"),
            Err(FrameError::InvalidNumber { field: 0 })
        );
    }

    #[test]
    fn test_parse_pose_line() {
        assert_eq!(
            parse_line("90,45,90,90,120").unwrap(),
            Some(CommandFrame::Pose {
                angles: [90.0, 45.0, 90.0, 90.0],
                gripper: GripperField::Angle(120.0),
            })
        );
    }

    #[test]
    fn test_pose_cycle_sentinel() {
        assert_eq!(
            parse_line("90,45,90,90, 1").unwrap(),
            Some(CommandFrame::Pose {
                angles: [90.0, 45.0, 90.0, 90.0],
                gripper: GripperField::Cycle,
            })
        );
        // Only the literal "1" is the sentinel
        assert_eq!(
            parse_line("90,45,90,90,1.0").unwrap(),
            Some(CommandFrame::Pose {
                angles: [90.0, 45.0, 90.0, 90.0],
                gripper: GripperField::Angle(1.0),
            })
        );
    }

    #[test]
    fn test_pose_wrong_field_count() {
        assert_eq!(
            parse_line("90,45,90"),
            Err(FrameError::FieldCount {
                expected: 5,
                found: 3
            })
        );
    }

    #[test]
    fn test_bare_cycle_and_blank() {
        assert_eq!(parse_line(" 1 ").unwrap(), Some(CommandFrame::GripperCycle));
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("2"), Err(FrameError::UnknownCommand));
    }
}
