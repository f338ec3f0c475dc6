//! Actuator driver traits
//!
//! The core never touches pins or timers; it hands positions to these
//! traits and expects the driver to turn them into pulses or duty cycles.

/// Stepper-style driver with its own acceleration profile
///
/// Positions are in driver steps. The driver plans towards the most recent
/// target and emits at most one step per [`service`](Self::service) call.
pub trait ContinuousActuator {
    /// Set the speed ceiling (steps/s) and acceleration (steps/s²)
    fn set_limits(&mut self, max_speed: f32, acceleration: f32);

    /// Aim at an absolute step position
    fn request_move(&mut self, target_steps: i32);

    /// Aim `delta_steps` away from the current target
    fn move_by(&mut self, delta_steps: i32);

    /// Redefine the current position without moving
    fn set_position(&mut self, steps: i32);

    /// Emit a step if one is due
    ///
    /// Returns `true` when a pulse was produced. Must be called as often
    /// as possible.
    fn service(&mut self) -> bool;

    /// Position reached so far, in steps
    fn position(&self) -> i32;

    /// Position being driven towards, in steps
    fn target(&self) -> i32;
}

/// Angle-commanded driver (hobby servo)
pub trait BoundedActuator {
    /// Command an angle in whole degrees, `0..=180`
    fn write(&mut self, angle: u8);
}
