//! Command dispatch and the per-tick control loop
//!
//! The [`Controller`] exclusively owns the joint model, the active session,
//! every actuator and the command parser. The firmware calls
//! [`Controller::tick`] as fast as it can; each tick:
//!
//! 1. services every continuous actuator (never skipped),
//! 2. drains the supplied bytes through the parser, applying each command
//!    as it completes,
//! 3. advances an active move and drives every joint, or
//! 4. holds every joint when no move is active.
//!
//! Replies for the host are queued and collected with
//! [`Controller::pop_reply`].

pub mod gripper;
pub mod state;

pub use gripper::CyclePlan;
pub use state::{MotionEvent, MotionState};

use aria_protocol::{Axis, CommandFrame, CommandParser, FrameError, GripperField, Reply};
use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};

use crate::actuator::{Actuator, JointDrive, ServoAxis, StepperAxis};
use crate::config::{
    ArmConfig, ConfigError, DriveType, GripperCycleConfig, MotionConfig, StepperConfig,
    ToggleConfig,
};
use crate::motion::{Clamp, MotionError, Progress, Trajectory};
use crate::traits::{BoundedActuator, ContinuousActuator};
use crate::MAX_JOINTS;

/// Reply lines buffered between drains
pub const REPLY_QUEUE_LEN: usize = 16;

/// Joints a CSV pose line sets before the gripper
const POSE_AXES: [Axis; 4] = [Axis::Shoulder, Axis::Elbow, Axis::WristRoll, Axis::WristPitch];

/// Errors building a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuildError {
    /// Configuration failed validation
    Config(ConfigError),
    /// Not enough drivers of the kind this joint needs
    MissingActuator { joint: u8 },
    /// More drivers supplied than joints use
    UnusedActuator,
    /// Joint model could not be built
    Motion(MotionError),
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        BuildError::Config(e)
    }
}

impl From<MotionError> for BuildError {
    fn from(e: MotionError) -> Self {
        BuildError::Motion(e)
    }
}

/// The arm's control loop
pub struct Controller<C, B, D> {
    trajectory: Trajectory,
    drives: Vec<JointDrive<C, B>, MAX_JOINTS>,
    parser: CommandParser,
    state: MotionState,
    replies: Deque<Reply, REPLY_QUEUE_LEN>,
    dropped_replies: u32,
    delay: D,
    stepper_joint: Option<usize>,
    home: Vec<f32, MAX_JOINTS>,
    stepper: StepperConfig,
    motion: MotionConfig,
    gripper_cycle: GripperCycleConfig,
    toggle: ToggleConfig,
}

impl<C, B, D> Controller<C, B, D>
where
    C: ContinuousActuator,
    B: BoundedActuator,
    D: DelayNs,
{
    /// Bind drivers to the configured joints
    ///
    /// Stepper joints take drivers from `steppers` and servo joints from
    /// `servos`, both in joint order. Every supplied driver must be used.
    pub fn new<S, V>(config: &ArmConfig, steppers: S, servos: V, delay: D) -> Result<Self, BuildError>
    where
        S: IntoIterator<Item = C>,
        V: IntoIterator<Item = B>,
    {
        config.validate()?;

        let trajectory = Trajectory::new(
            config.joints.iter().map(|j| (j.kind(), j.home_deg)),
            config.motion.min_duration_ms,
        )?;

        let mut steppers = steppers.into_iter();
        let mut servos = servos.into_iter();
        let mut drives = Vec::new();
        for (i, joint) in config.joints.iter().enumerate() {
            let missing = BuildError::MissingActuator { joint: i as u8 };
            let drive = match joint.drive {
                DriveType::Stepper => {
                    let driver = steppers.next().ok_or(missing)?;
                    JointDrive::Continuous(StepperAxis::new(driver, config.stepper.steps_per_degree))
                }
                DriveType::Servo => {
                    let driver = servos.next().ok_or(missing)?;
                    JointDrive::Bounded(ServoAxis::new(driver, joint.min_deg, joint.max_deg))
                }
            };
            drives
                .push(drive)
                .map_err(|_| BuildError::Motion(MotionError::TooManyJoints))?;
        }
        if steppers.next().is_some() || servos.next().is_some() {
            return Err(BuildError::UnusedActuator);
        }

        Ok(Self {
            parser: CommandParser::new(config.joint_count()),
            trajectory,
            drives,
            state: MotionState::Idle,
            replies: Deque::new(),
            dropped_replies: 0,
            delay,
            stepper_joint: config.stepper_joint(),
            home: config.home_pose(),
            stepper: config.stepper,
            motion: config.motion,
            gripper_cycle: config.gripper_cycle,
            toggle: config.toggle,
        })
    }

    /// Bring actuators to the home pose and queue the banner
    pub fn boot(&mut self) {
        for (drive, joint) in self.drives.iter_mut().zip(self.trajectory.joints()) {
            if let Some(axis) = drive.as_stepper_mut() {
                let steps = axis.steps_for(joint.current);
                let driver = axis.driver_mut();
                driver.set_limits(self.stepper.max_speed, self.stepper.acceleration);
                driver.set_position(steps);
            }
            drive.hold(joint);
        }

        self.reply(Reply::Online);
        self.reply(Reply::Protocol {
            joints: self.trajectory.len() as u8,
        });
    }

    /// Run one control-loop pass at `now_ms`
    ///
    /// `input` should yield whatever bytes have arrived since the last tick
    /// without blocking.
    pub fn tick<I>(&mut self, now_ms: u32, input: I)
    where
        I: IntoIterator<Item = u8>,
    {
        self.service();

        for byte in input {
            let result = self.parser.feed(byte);
            if !matches!(result, Ok(None)) && self.parser.last_truncated() {
                self.reply(Reply::Truncated);
            }
            match result {
                Ok(Some(command)) => self.apply(command, now_ms),
                Ok(None) => {}
                Err(e) => self.reply(Reply::Error(e)),
            }
        }

        match self.trajectory.advance(now_ms) {
            Progress::Moving => self.drive_all(),
            Progress::Done => {
                self.drive_all();
                self.state = self.state.transition(MotionEvent::Finished);
                self.reply(Reply::Done);
            }
            Progress::Idle => self.hold_all(),
        }
    }

    /// Give every actuator a chance to pulse; returns the pulse count
    pub fn service(&mut self) -> usize {
        self.drives
            .iter_mut()
            .map(|d| d.service())
            .filter(|&pulsed| pulsed)
            .count()
    }

    /// Apply one decoded command
    pub fn apply(&mut self, command: CommandFrame, now_ms: u32) {
        match command {
            CommandFrame::Absolute {
                targets,
                duration_ms,
            } => self.move_to(&targets, duration_ms, now_ms),
            CommandFrame::Home => self.home(now_ms),
            CommandFrame::RelativeStep { delta } => self.step_base(delta),
            CommandFrame::SingleAxis { axis, angle } => self.set_joint(axis.joint(), angle),
            CommandFrame::Pose { angles, gripper } => {
                for (axis, angle) in POSE_AXES.iter().zip(angles) {
                    self.set_joint(axis.joint(), angle);
                }
                match gripper {
                    GripperField::Angle(angle) => self.set_joint(Axis::Gripper.joint(), angle),
                    GripperField::Cycle => self.cycle_gripper(),
                }
            }
            CommandFrame::Toggle => self.toggle_gripper(),
            CommandFrame::GripperCycle => self.cycle_gripper(),
        }
    }

    /// Arm an eased move of every joint
    fn move_to(&mut self, targets: &[f32], duration_ms: u32, now_ms: u32) {
        match self.trajectory.arm(targets, duration_ms, now_ms) {
            Ok(armed) => {
                self.state = self.state.transition(MotionEvent::Armed);
                let targets = self.trajectory.joints().iter().map(|j| j.target).collect();
                self.reply(Reply::MovingTo {
                    targets,
                    duration_ms: armed.duration_ms,
                });
                for clamp in armed.clamped {
                    self.reply_clamp(clamp);
                }
            }
            Err(e) => self.reply_motion_error(e),
        }
    }

    fn home(&mut self, now_ms: u32) {
        match self
            .trajectory
            .arm(&self.home, self.motion.home_duration_ms, now_ms)
        {
            Ok(armed) => {
                self.state = self.state.transition(MotionEvent::Armed);
                self.reply(Reply::Homing {
                    duration_ms: armed.duration_ms,
                });
            }
            Err(e) => self.reply_motion_error(e),
        }
    }

    /// Relative base move, handed straight to the driver
    fn step_base(&mut self, delta: i32) {
        let Some(index) = self.stepper_joint else {
            self.reply(Reply::NoSuchJoint { joint: 0 });
            return;
        };
        let Some(axis) = self.drives.get_mut(index).and_then(|d| d.as_stepper_mut()) else {
            self.reply(Reply::NoSuchJoint { joint: index as u8 });
            return;
        };

        axis.driver_mut().move_by(delta);
        // Keep the model on the driver's target step so later moves start there
        let landed = axis.degrees_at(axis.driver().target());
        if let Some(current) = self.trajectory.joint(index).map(|j| j.current) {
            let _ = self.trajectory.shift(index, landed - current);
        }
        self.reply(Reply::BaseStep { delta });
    }

    /// Immediate absolute set of one joint
    fn set_joint(&mut self, index: usize, angle: f32) {
        match self.trajectory.set_immediate(index, angle) {
            Ok(clamp) => {
                if let Some(clamp) = clamp {
                    self.reply_clamp(clamp);
                }
                if let Some(angle) = self.write_joint(index) {
                    self.reply(Reply::Set {
                        joint: index as u8,
                        angle,
                    });
                }
            }
            Err(e) => self.reply_motion_error(e),
        }
    }

    fn toggle_gripper(&mut self) {
        let index = Axis::Gripper.joint();
        let Some(current) = self.trajectory.joint(index).map(|j| j.current) else {
            self.reply(Reply::NoSuchJoint { joint: index as u8 });
            return;
        };

        let target = gripper::toggle_target(current, &self.toggle);
        if let Ok(Some(clamp)) = self.trajectory.set_immediate(index, target) {
            self.reply_clamp(clamp);
        }
        if let Some(angle) = self.write_joint(index) {
            self.reply(Reply::Gripper { angle });
        }
    }

    /// Blocking close/open sweep of the gripper
    fn cycle_gripper(&mut self) {
        let index = Axis::Gripper.joint();
        let Some(joint) = self.trajectory.joint(index).copied() else {
            self.reply(Reply::NoSuchJoint { joint: index as u8 });
            return;
        };
        let Some(axis) = self.drives.get_mut(index).and_then(|d| d.as_servo_mut()) else {
            self.reply(Reply::NoSuchJoint { joint: index as u8 });
            return;
        };

        let plan = CyclePlan::new(joint.current, joint.kind, &self.gripper_cycle);
        let end = gripper::run_cycle(axis, &mut self.delay, &plan, &self.gripper_cycle);
        let _ = self.trajectory.set_immediate(index, end);

        self.reply(Reply::GripperCycle {
            start: plan.start,
            closed: plan.closed,
            open: plan.open,
        });
    }

    /// Send one joint's position to its actuator, returning that position
    fn write_joint(&mut self, index: usize) -> Option<f32> {
        let joint = self.trajectory.joint(index)?;
        self.drives.get_mut(index)?.drive(joint);
        Some(joint.current)
    }

    fn drive_all(&mut self) {
        for (drive, joint) in self.drives.iter_mut().zip(self.trajectory.joints()) {
            drive.drive(joint);
        }
    }

    fn hold_all(&mut self) {
        for (drive, joint) in self.drives.iter_mut().zip(self.trajectory.joints()) {
            drive.hold(joint);
        }
    }

    fn reply_clamp(&mut self, clamp: Clamp) {
        self.reply(Reply::Clamped {
            joint: clamp.joint,
            requested: clamp.requested,
            applied: clamp.applied,
        });
    }

    fn reply_motion_error(&mut self, e: MotionError) {
        let reply = match e {
            // The bracketed frame carries one extra field for the duration
            MotionError::TargetCount { expected, found } => Reply::Error(FrameError::FieldCount {
                expected: expected.saturating_add(1),
                found: found.saturating_add(1),
            }),
            MotionError::NoSuchJoint { joint } => Reply::NoSuchJoint { joint },
            MotionError::TooManyJoints => Reply::Error(FrameError::UnknownCommand),
        };
        self.reply(reply);
    }
}

impl<C, B, D> Controller<C, B, D> {
    /// Take the oldest queued reply
    pub fn pop_reply(&mut self) -> Option<Reply> {
        self.replies.pop_front()
    }

    /// Replies lost because the queue was full
    pub fn dropped_replies(&self) -> u32 {
        self.dropped_replies
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn drive(&self, index: usize) -> Option<&JointDrive<C, B>> {
        self.drives.get(index)
    }

    pub fn joint_count(&self) -> usize {
        self.trajectory.len()
    }

    /// Queue a reply, dropping it when the queue is full
    fn reply(&mut self, reply: Reply) {
        if self.replies.push_back(reply).is_err() {
            self.dropped_replies = self.dropped_replies.wrapping_add(1);
        }
    }
}
