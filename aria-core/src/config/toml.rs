//! Simple TOML reader for the arm configuration
//!
//! Handles only the subset `arm.toml` needs and allocates nothing, so it
//! runs on the target at boot. It is NOT a complete TOML parser.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float)
//! - `[section]` headers
//! - `[[joint]]` array-of-tables headers, one per joint in id order
//! - Comments (# ...)
//!
//! Unknown keys are ignored. When at least one `[[joint]]` is present the
//! default joint list is replaced.

use heapless::String;

use super::types::{ArmConfig, ConfigError, DriveType, JointConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Parsed but failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Stepper,
    Servo,
    Motion,
    GripperCycle,
    Toggle,
    Serial,
    Joint,
}

/// Parse TOML text into a validated [`ArmConfig`]
pub fn parse_config(input: &str) -> Result<ArmConfig, ParseError> {
    let mut config = ArmConfig::new();
    let mut section = Section::Root;
    let mut joints_replaced = false;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("[[") {
            let name = line
                .strip_prefix("[[")
                .and_then(|l| l.strip_suffix("]]"))
                .ok_or(ParseError::InvalidSection)?;
            if name.trim() != "joint" {
                return Err(ParseError::InvalidSection);
            }
            if !joints_replaced {
                config.joints.clear();
                joints_replaced = true;
            }
            config
                .joints
                .push(JointConfig::default())
                .map_err(|_| ParseError::TooManyItems)?;
            section = Section::Joint;
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&mut config, section, key, value)?;
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "stepper" => Ok(Section::Stepper),
        "servo" => Ok(Section::Servo),
        "motion" => Ok(Section::Motion),
        "gripper_cycle" => Ok(Section::GripperCycle),
        "toggle" => Ok(Section::Toggle),
        "serial" => Ok(Section::Serial),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: String<24> = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a float value; integers are accepted
fn parse_float(value: &str) -> Result<f32, ParseError> {
    let v: f32 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ParseError::InvalidValue)
    }
}

fn parse_drive(value: &str) -> Result<DriveType, ParseError> {
    match parse_string(value) {
        "stepper" => Ok(DriveType::Stepper),
        "servo" => Ok(DriveType::Servo),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    config: &mut ArmConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Stepper => {
            let s = &mut config.stepper;
            match key {
                "steps_per_degree" => s.steps_per_degree = parse_float(value)?,
                "max_speed" => s.max_speed = parse_float(value)?,
                "acceleration" => s.acceleration = parse_float(value)?,
                "pulse_width_us" => s.pulse_width_us = parse_int(value)?,
                _ => {}
            }
        }
        Section::Servo => {
            let s = &mut config.servo;
            match key {
                "min_pulse_us" => s.min_pulse_us = parse_int(value)?,
                "max_pulse_us" => s.max_pulse_us = parse_int(value)?,
                "period_us" => s.period_us = parse_int(value)?,
                _ => {}
            }
        }
        Section::Motion => {
            let m = &mut config.motion;
            match key {
                "min_duration_ms" => m.min_duration_ms = parse_int(value)?,
                "home_duration_ms" => m.home_duration_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::GripperCycle => {
            let g = &mut config.gripper_cycle;
            match key {
                "close_delta_deg" => g.close_delta_deg = parse_float(value)?,
                "open_delta_deg" => g.open_delta_deg = parse_float(value)?,
                "step_deg" => g.step_deg = parse_float(value)?,
                "step_interval_ms" => g.step_interval_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Toggle => {
            let t = &mut config.toggle;
            match key {
                "open_deg" => t.open_deg = parse_float(value)?,
                "closed_deg" => t.closed_deg = parse_float(value)?,
                _ => {}
            }
        }
        Section::Serial => {
            if key == "baud" {
                config.serial.baud = parse_int(value)?;
            }
        }
        Section::Joint => {
            // A [[joint]] header always pushed an entry first
            let joint = config.joints.last_mut().ok_or(ParseError::InvalidSection)?;
            match key {
                "name" => {
                    joint.name = String::try_from(parse_string(value))
                        .map_err(|_| ParseError::InvalidValue)?;
                }
                "drive" => joint.drive = parse_drive(value)?,
                "min_deg" => joint.min_deg = parse_float(value)?,
                "max_deg" => joint.max_deg = parse_float(value)?,
                "home_deg" => joint.home_deg = parse_float(value)?,
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("a = 5"), Some(("a", "5")));
        assert_eq!(parse_key_value("a = 5 # five"), Some(("a", "5")));
        assert_eq!(
            parse_key_value("name = \"a#b\""),
            Some(("name", "\"a#b\""))
        );
        assert_eq!(parse_key_value("a ="), None);
    }

    #[test]
    fn test_parse_int_separators() {
        assert_eq!(parse_int::<u32>("115_200").unwrap(), 115_200);
        assert_eq!(parse_int::<u32>("-1"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), ArmConfig::default());
    }

    #[test]
    fn test_firmware_config_matches_defaults() {
        let embedded = include_str!("../../../aria-firmware/arm.toml");
        assert_eq!(parse_config(embedded).unwrap(), ArmConfig::default());
    }

    #[test]
    fn test_parse_sections() {
        let config = parse_config(
            r#"
[stepper]
steps_per_degree = 17.76
max_speed = 4000

[motion]
min_duration_ms = 250

[gripper_cycle]
close_delta_deg = -45

[serial]
baud = 57_600
"#,
        )
        .unwrap();
        assert_eq!(config.stepper.steps_per_degree, 17.76);
        assert_eq!(config.stepper.max_speed, 4000.0);
        assert_eq!(config.stepper.acceleration, 5000.0);
        assert_eq!(config.motion.min_duration_ms, 250);
        assert_eq!(config.gripper_cycle.close_delta_deg, -45.0);
        assert_eq!(config.serial.baud, 57_600);
        assert_eq!(config.joint_count(), 6);
    }

    #[test]
    fn test_joint_tables_replace_defaults() {
        let config = parse_config(
            r#"
[[joint]]
name = "base"
drive = "stepper"
home_deg = 0

[[joint]]
name = "lift"
min_deg = 20
max_deg = 160 # mechanical stop
"#,
        )
        .unwrap();
        assert_eq!(config.joint_count(), 2);
        assert_eq!(config.joints[0].drive, DriveType::Stepper);
        assert_eq!(config.joints[1].name.as_str(), "lift");
        assert_eq!(config.joints[1].min_deg, 20.0);
        assert_eq!(config.joints[1].max_deg, 160.0);
        assert_eq!(config.joints[1].home_deg, 90.0);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_config("[heater]"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[[jar]]"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("[motion]\nmin_duration_ms = soon"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[[joint]]\ndrive = \"hydraulic\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[[joint]]\nmax_deg = 270"),
            Err(ParseError::Invalid(ConfigError::InvalidBounds { joint: 0 }))
        );

        let mut many = heapless::String::<256>::new();
        for _ in 0..9 {
            many.push_str("[[joint]]\n").unwrap();
        }
        assert_eq!(parse_config(&many), Err(ParseError::TooManyItems));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse_config("[toggle]\ncolour = \"red\"\nopen_deg = 10").unwrap();
        assert_eq!(config.toggle.open_deg, 10.0);
    }
}
