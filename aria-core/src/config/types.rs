//! Configuration type definitions
//!
//! These types describe the arm: its joints, the base stepper, servo pulse
//! timing and the parameters of the scripted gestures. The defaults match
//! the six-axis arm (stepper base plus five servos).

use heapless::{String, Vec};

use crate::motion::JointKind;
use crate::MAX_JOINTS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum joint name length
pub const MAX_NAME_LEN: usize = 16;

/// How a joint is actuated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DriveType {
    /// Continuous joint on a step/dir driver
    Stepper,
    /// Bounded joint on a hobby servo
    #[default]
    Servo,
}

/// One joint
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JointConfig {
    pub name: String<MAX_NAME_LEN>,
    pub drive: DriveType,
    /// Lower bound in degrees (servo only)
    pub min_deg: f32,
    /// Upper bound in degrees (servo only)
    pub max_deg: f32,
    /// Safe pose used at boot and by the home command
    pub home_deg: f32,
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            drive: DriveType::Servo,
            min_deg: 0.0,
            max_deg: 180.0,
            home_deg: 90.0,
        }
    }
}

impl JointConfig {
    /// Full-range servo joint
    pub fn servo(name: &str, home_deg: f32) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            home_deg,
            ..Self::default()
        }
    }

    /// Stepper joint
    pub fn stepper(name: &str, home_deg: f32) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            drive: DriveType::Stepper,
            home_deg,
            ..Self::default()
        }
    }

    /// Range behaviour for the motion model
    pub fn kind(&self) -> JointKind {
        match self.drive {
            DriveType::Stepper => JointKind::Continuous,
            DriveType::Servo => JointKind::Bounded {
                min: self.min_deg,
                max: self.max_deg,
            },
        }
    }
}

/// Base stepper configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StepperConfig {
    /// Driver steps per joint degree (gearing and microstepping included)
    pub steps_per_degree: f32,
    /// Speed ceiling in steps/s
    pub max_speed: f32,
    /// Acceleration in steps/s²
    pub acceleration: f32,
    /// STEP pulse high time in µs
    pub pulse_width_us: u32,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            steps_per_degree: 8.88,
            max_speed: 5000.0,
            acceleration: 5000.0,
            pulse_width_us: 2,
        }
    }
}

/// Servo pulse timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServoPulseConfig {
    /// Pulse width at 0°
    pub min_pulse_us: u16,
    /// Pulse width at 180°
    pub max_pulse_us: u16,
    /// PWM period (20 ms for 50 Hz)
    pub period_us: u16,
}

impl Default for ServoPulseConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 544,
            max_pulse_us: 2400,
            period_us: 20_000,
        }
    }
}

/// Eased move timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Shortest allowed move; shorter requests are stretched
    pub min_duration_ms: u32,
    /// Duration of the home move
    pub home_duration_ms: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 500,
            home_duration_ms: 2000,
        }
    }
}

/// Scripted gripper close/open sweep
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GripperCycleConfig {
    /// First phase, relative to the starting angle
    pub close_delta_deg: f32,
    /// Second phase, relative to where the first ended
    pub open_delta_deg: f32,
    /// Angle change per write
    pub step_deg: f32,
    /// Wait between writes
    pub step_interval_ms: u32,
}

impl Default for GripperCycleConfig {
    fn default() -> Self {
        Self {
            close_delta_deg: -60.0,
            open_delta_deg: 50.0,
            step_deg: 1.0,
            step_interval_ms: 15,
        }
    }
}

/// Gripper toggle poses
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToggleConfig {
    pub open_deg: f32,
    pub closed_deg: f32,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            open_deg: 0.0,
            closed_deg: 180.0,
        }
    }
}

/// Serial link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerialConfig {
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { baud: 115_200 }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No joints defined
    NoJoints,
    /// More than one stepper joint
    MultipleSteppers,
    /// Servo bounds outside 0..=180 or inverted
    InvalidBounds { joint: u8 },
    /// Home angle not finite or outside the joint's bounds
    InvalidHome { joint: u8 },
    /// Stepper scale or limits not positive
    InvalidStepper,
    /// Servo pulse widths do not fit the period
    InvalidServoPulse,
    /// Gripper sweep parameters unusable
    InvalidGripperCycle,
    /// Toggle poses outside 0..=180
    InvalidToggle,
    /// Zero move duration
    InvalidMotion,
}

/// Complete arm configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArmConfig {
    /// Joints in id order; index 0 is normally the base
    #[cfg_attr(feature = "serde", serde(rename = "joint"))]
    pub joints: Vec<JointConfig, MAX_JOINTS>,
    pub stepper: StepperConfig,
    pub servo: ServoPulseConfig,
    pub motion: MotionConfig,
    pub gripper_cycle: GripperCycleConfig,
    pub toggle: ToggleConfig,
    pub serial: SerialConfig,
}

impl Default for ArmConfig {
    fn default() -> Self {
        let mut joints = Vec::new();
        for joint in [
            JointConfig::stepper("base", 0.0),
            JointConfig::servo("shoulder", 90.0),
            JointConfig::servo("elbow", 90.0),
            JointConfig::servo("wrist_roll", 90.0),
            JointConfig::servo("wrist_pitch", 90.0),
            JointConfig::servo("gripper", 90.0),
        ] {
            let _ = joints.push(joint);
        }

        Self {
            joints,
            stepper: StepperConfig::default(),
            servo: ServoPulseConfig::default(),
            motion: MotionConfig::default(),
            gripper_cycle: GripperCycleConfig::default(),
            toggle: ToggleConfig::default(),
            serial: SerialConfig::default(),
        }
    }
}

impl ArmConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Index of the stepper joint, if any
    pub fn stepper_joint(&self) -> Option<usize> {
        self.joints.iter().position(|j| j.drive == DriveType::Stepper)
    }

    /// Home angles in joint order
    pub fn home_pose(&self) -> Vec<f32, MAX_JOINTS> {
        self.joints.iter().map(|j| j.home_deg).collect()
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.joints.is_empty() {
            return Err(ConfigError::NoJoints);
        }

        let steppers = self
            .joints
            .iter()
            .filter(|j| j.drive == DriveType::Stepper)
            .count();
        if steppers > 1 {
            return Err(ConfigError::MultipleSteppers);
        }

        for (i, joint) in self.joints.iter().enumerate() {
            let id = i as u8;
            if !joint.home_deg.is_finite() {
                return Err(ConfigError::InvalidHome { joint: id });
            }
            if joint.drive == DriveType::Servo {
                if !in_servo_range(joint.min_deg)
                    || !in_servo_range(joint.max_deg)
                    || joint.min_deg > joint.max_deg
                {
                    return Err(ConfigError::InvalidBounds { joint: id });
                }
                if joint.home_deg < joint.min_deg || joint.home_deg > joint.max_deg {
                    return Err(ConfigError::InvalidHome { joint: id });
                }
            }
        }

        if steppers == 1 {
            let s = &self.stepper;
            if !(s.steps_per_degree > 0.0 && s.steps_per_degree.is_finite())
                || !(s.max_speed > 0.0 && s.max_speed.is_finite())
                || !(s.acceleration > 0.0 && s.acceleration.is_finite())
            {
                return Err(ConfigError::InvalidStepper);
            }
        }

        let p = &self.servo;
        if p.min_pulse_us >= p.max_pulse_us || p.max_pulse_us >= p.period_us {
            return Err(ConfigError::InvalidServoPulse);
        }

        let g = &self.gripper_cycle;
        if !(g.step_deg > 0.0 && g.step_deg.is_finite())
            || !g.close_delta_deg.is_finite()
            || !g.open_delta_deg.is_finite()
        {
            return Err(ConfigError::InvalidGripperCycle);
        }

        if !in_servo_range(self.toggle.open_deg) || !in_servo_range(self.toggle.closed_deg) {
            return Err(ConfigError::InvalidToggle);
        }

        if self.motion.min_duration_ms == 0 {
            return Err(ConfigError::InvalidMotion);
        }

        Ok(())
    }
}

fn in_servo_range(deg: f32) -> bool {
    (0.0..=180.0).contains(&deg)
}
