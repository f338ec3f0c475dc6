//! Hardware abstraction traits
//!
//! These traits define the interface between the motion logic and the
//! concrete stepper and servo drivers.

pub mod actuator;

pub use actuator::{BoundedActuator, ContinuousActuator};
