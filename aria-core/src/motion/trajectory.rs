//! Eased multi-joint trajectories
//!
//! All joints share one [`MotionSession`]. Arming a move re-snapshots every
//! joint's start from its current position, so a new command preempts an
//! in-flight move from wherever the arm has got to.

use heapless::Vec;

use super::ease::smoothstep;
use super::joint::{Clamp, Joint, JointKind};
use super::session::MotionSession;
use crate::MAX_JOINTS;

/// Errors from trajectory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Target list length does not match the joint count
    TargetCount { expected: u8, found: u8 },
    /// Joint index out of range
    NoSuchJoint { joint: u8 },
    /// Too many joints for the fixed capacity
    TooManyJoints,
}

/// Result of arming a move
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Armed {
    /// Duration actually used, after the minimum floor
    pub duration_ms: u32,
    /// Targets that were pulled into range
    pub clamped: Vec<Clamp, MAX_JOINTS>,
}

/// Outcome of advancing the trajectory by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// No move in progress
    Idle,
    /// Joints updated, move continues
    Moving,
    /// Joints reached their targets this tick
    Done,
}

/// Joint set plus the shared session
#[derive(Debug, Clone)]
pub struct Trajectory {
    joints: Vec<Joint, MAX_JOINTS>,
    session: MotionSession,
    min_duration_ms: u32,
}

impl Trajectory {
    /// Build from `(kind, home)` pairs; joint ids follow iteration order
    pub fn new<I>(joints: I, min_duration_ms: u32) -> Result<Self, MotionError>
    where
        I: IntoIterator<Item = (JointKind, f32)>,
    {
        let mut list = Vec::new();
        for (id, (kind, home)) in joints.into_iter().enumerate() {
            list.push(Joint::new(id as u8, kind, home))
                .map_err(|_| MotionError::TooManyJoints)?;
        }
        Ok(Self {
            joints: list,
            session: MotionSession::new(),
            // A zero duration would divide by zero in the ease
            min_duration_ms: min_duration_ms.max(1),
        })
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn min_duration_ms(&self) -> u32 {
        self.min_duration_ms
    }

    /// Start an eased move of every joint to `targets`
    ///
    /// Targets are clamped per joint and the duration is floored at the
    /// configured minimum.
    pub fn arm(
        &mut self,
        targets: &[f32],
        duration_ms: u32,
        now_ms: u32,
    ) -> Result<Armed, MotionError> {
        if targets.len() != self.joints.len() {
            return Err(MotionError::TargetCount {
                expected: self.joints.len() as u8,
                found: targets.len().min(u8::MAX as usize) as u8,
            });
        }

        let mut clamped = Vec::new();
        for (joint, &target) in self.joints.iter_mut().zip(targets) {
            if let Some(clamp) = joint.arm(target) {
                // Capacity matches the joint count
                let _ = clamped.push(clamp);
            }
        }

        let duration_ms = duration_ms.max(self.min_duration_ms);
        self.session.arm(now_ms, duration_ms);

        Ok(Armed {
            duration_ms,
            clamped,
        })
    }

    /// Set one joint directly, bypassing easing
    pub fn set_immediate(&mut self, index: usize, value: f32) -> Result<Option<Clamp>, MotionError> {
        let joint = self
            .joints
            .get_mut(index)
            .ok_or(MotionError::NoSuchJoint { joint: index as u8 })?;
        Ok(joint.set_immediate(value))
    }

    /// Shift one joint by `delta` degrees without touching the session
    pub fn shift(&mut self, index: usize, delta: f32) -> Result<(), MotionError> {
        let joint = self
            .joints
            .get_mut(index)
            .ok_or(MotionError::NoSuchJoint { joint: index as u8 })?;
        joint.shift(delta);
        Ok(())
    }

    /// Recompute every joint for `now_ms`
    pub fn advance(&mut self, now_ms: u32) -> Progress {
        if !self.session.is_active() {
            return Progress::Idle;
        }

        let e = self.session.elapsed(now_ms);
        if e >= 1.0 {
            for joint in self.joints.iter_mut() {
                joint.settle();
            }
            self.session.finish();
            return Progress::Done;
        }

        let k = smoothstep(e);
        for joint in self.joints.iter_mut() {
            joint.interpolate(k);
        }
        Progress::Moving
    }
}
