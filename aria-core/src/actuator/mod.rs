//! Per-joint actuator binding
//!
//! Each joint gets exactly one [`JointDrive`], chosen once from its kind at
//! construction. The control loop only talks to the [`Actuator`] trait.

pub mod servo;
pub mod stepper;

#[cfg(test)]
pub(crate) mod mock;

pub use servo::ServoAxis;
pub use stepper::StepperAxis;

use crate::motion::Joint;
use crate::traits::{BoundedActuator, ContinuousActuator};

/// Sink that turns a joint's position into a hardware command
pub trait Actuator {
    /// Give the driver a chance to emit a pulse; `true` if it did
    fn service(&mut self) -> bool;

    /// Command the joint's current position during a move
    fn drive(&mut self, joint: &Joint);

    /// Refresh the output while no move is running
    fn hold(&mut self, joint: &Joint);
}

/// Actuator for one joint
#[derive(Debug)]
pub enum JointDrive<C, B> {
    Continuous(StepperAxis<C>),
    Bounded(ServoAxis<B>),
}

impl<C, B> JointDrive<C, B> {
    pub fn as_stepper(&self) -> Option<&StepperAxis<C>> {
        match self {
            JointDrive::Continuous(axis) => Some(axis),
            JointDrive::Bounded(_) => None,
        }
    }

    pub fn as_servo(&self) -> Option<&ServoAxis<B>> {
        match self {
            JointDrive::Bounded(axis) => Some(axis),
            JointDrive::Continuous(_) => None,
        }
    }

    pub fn as_stepper_mut(&mut self) -> Option<&mut StepperAxis<C>> {
        match self {
            JointDrive::Continuous(axis) => Some(axis),
            JointDrive::Bounded(_) => None,
        }
    }

    pub fn as_servo_mut(&mut self) -> Option<&mut ServoAxis<B>> {
        match self {
            JointDrive::Bounded(axis) => Some(axis),
            JointDrive::Continuous(_) => None,
        }
    }
}

impl<C: ContinuousActuator, B: BoundedActuator> Actuator for JointDrive<C, B> {
    fn service(&mut self) -> bool {
        match self {
            JointDrive::Continuous(axis) => axis.service(),
            JointDrive::Bounded(axis) => axis.service(),
        }
    }

    fn drive(&mut self, joint: &Joint) {
        match self {
            JointDrive::Continuous(axis) => axis.drive(joint),
            JointDrive::Bounded(axis) => axis.drive(joint),
        }
    }

    fn hold(&mut self, joint: &Joint) {
        match self {
            JointDrive::Continuous(axis) => axis.hold(joint),
            JointDrive::Bounded(axis) => axis.hold(joint),
        }
    }
}
