//! Scripted gripper gestures
//!
//! The cycle is a blocking two-phase ramp: close by `close_delta_deg`, then
//! open by `open_delta_deg` from where the close ended. Both ramps always run
//! their full length; each written angle is clamped into range on its own,
//! so a ramp that runs past a bound holds there for its remaining steps.
//! Nothing else runs while it sweeps.

use embedded_hal::delay::DelayNs;

use crate::actuator::servo::SERVO_MAX_DEG;
use crate::actuator::ServoAxis;
use crate::config::{GripperCycleConfig, ToggleConfig};
use crate::motion::JointKind;
use crate::traits::BoundedActuator;

/// Angles visited by one gripper cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CyclePlan {
    pub start: f32,
    /// End of the close phase, in range
    pub closed: f32,
    /// End of the open phase, in range
    pub open: f32,
    /// Unclamped end of the close ramp
    pub close_to: f32,
    /// Unclamped end of the open ramp
    pub open_to: f32,
}

impl CyclePlan {
    /// Plan a cycle from `start`
    ///
    /// The ramps follow the raw deltas; only the reported phase targets are
    /// clamped, each independently.
    pub fn new(start: f32, kind: JointKind, config: &GripperCycleConfig) -> Self {
        let limit = |deg: f32| kind.clamp(deg).max(0.0).min(SERVO_MAX_DEG as f32);
        let close_to = start + config.close_delta_deg;
        let open_to = close_to + config.open_delta_deg;
        Self {
            start,
            closed: limit(close_to),
            open: limit(open_to),
            close_to,
            open_to,
        }
    }
}

/// Step the servo from `from` to `to`, waiting between writes
///
/// Every write is clamped by the axis. Returns the last angle written.
pub fn sweep<B, D>(
    axis: &mut ServoAxis<B>,
    delay: &mut D,
    from: f32,
    to: f32,
    config: &GripperCycleConfig,
) -> f32
where
    B: BoundedActuator,
    D: DelayNs,
{
    let mut angle = from;
    let mut written = axis.clamp_angle(from);
    while angle != to {
        let mut next = if to > angle {
            (angle + config.step_deg).min(to)
        } else {
            (angle - config.step_deg).max(to)
        };
        if next == angle {
            // Step below float resolution at this angle
            next = to;
        }
        angle = next;
        written = axis.write_angle(angle);
        delay.delay_ms(config.step_interval_ms);
    }
    written as f32
}

/// Run both phases of a planned cycle
pub fn run_cycle<B, D>(
    axis: &mut ServoAxis<B>,
    delay: &mut D,
    plan: &CyclePlan,
    config: &GripperCycleConfig,
) -> f32
where
    B: BoundedActuator,
    D: DelayNs,
{
    sweep(axis, delay, plan.start, plan.close_to, config);
    sweep(axis, delay, plan.close_to, plan.open_to, config)
}

/// Pose a toggle moves to from `current`
///
/// Whichever of the open and closed poses is farther from the current
/// angle wins; exactly half way goes to open.
pub fn toggle_target(current: f32, config: &ToggleConfig) -> f32 {
    let to_open = current - config.open_deg;
    let to_closed = current - config.closed_deg;
    if to_closed * to_closed <= to_open * to_open {
        config.open_deg
    } else {
        config.closed_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::mock::{MockDelay, MockServo};

    const SERVO: JointKind = JointKind::Bounded {
        min: 0.0,
        max: 180.0,
    };

    #[test]
    fn test_plan_default_deltas() {
        let plan = CyclePlan::new(90.0, SERVO, &GripperCycleConfig::default());
        assert_eq!(plan.closed, 30.0);
        assert_eq!(plan.open, 80.0);
    }

    #[test]
    fn test_plan_clamps_phases() {
        let plan = CyclePlan::new(20.0, SERVO, &GripperCycleConfig::default());
        assert_eq!(plan.closed, 0.0);
        assert_eq!(plan.open, 10.0);
        assert_eq!(plan.close_to, -40.0);
        assert_eq!(plan.open_to, 10.0);

        let narrow = JointKind::Bounded {
            min: 40.0,
            max: 60.0,
        };
        let plan = CyclePlan::new(50.0, narrow, &GripperCycleConfig::default());
        assert_eq!(plan.closed, 40.0);
        assert_eq!(plan.open, 40.0);

        let reversed = GripperCycleConfig {
            close_delta_deg: 30.0,
            open_delta_deg: -50.0,
            ..GripperCycleConfig::default()
        };
        let plan = CyclePlan::new(170.0, SERVO, &reversed);
        assert_eq!(plan.closed, 180.0);
        assert_eq!(plan.open, 150.0);
    }

    #[test]
    fn test_sweep_steps_and_timing() {
        let config = GripperCycleConfig::default();
        let mut axis = ServoAxis::new(MockServo::default(), 0.0, 180.0);
        let mut delay = MockDelay::default();

        let end = sweep(&mut axis, &mut delay, 90.0, 85.0, &config);
        assert_eq!(end, 85.0);
        assert_eq!(axis.driver().history.as_slice(), &[89, 88, 87, 86, 85]);
        assert_eq!(delay.waited_ns, 5 * 15 * 1_000_000);
    }

    #[test]
    fn test_sweep_partial_last_step() {
        let config = GripperCycleConfig {
            step_deg: 4.0,
            ..GripperCycleConfig::default()
        };
        let mut axis = ServoAxis::new(MockServo::default(), 0.0, 180.0);
        let mut delay = MockDelay::default();
        sweep(&mut axis, &mut delay, 10.0, 20.0, &config);
        assert_eq!(axis.driver().history.as_slice(), &[14, 18, 20]);
    }

    #[test]
    fn test_full_cycle() {
        let config = GripperCycleConfig::default();
        let plan = CyclePlan::new(90.0, SERVO, &config);
        let mut axis = ServoAxis::new(MockServo::default(), 0.0, 180.0);
        let mut delay = MockDelay::default();

        let end = run_cycle(&mut axis, &mut delay, &plan, &config);
        assert_eq!(end, 80.0);
        // 60 steps down, 50 steps up
        assert_eq!(axis.driver().writes, 110);
        assert_eq!(axis.driver().history[59], 30);
        assert_eq!(axis.driver().last, Some(80));
    }

    #[test]
    fn test_clamped_cycle_keeps_full_length() {
        let config = GripperCycleConfig::default();
        let plan = CyclePlan::new(20.0, SERVO, &config);
        let mut axis = ServoAxis::new(MockServo::default(), 0.0, 180.0);
        let mut delay = MockDelay::default();

        let end = run_cycle(&mut axis, &mut delay, &plan, &config);
        assert_eq!(end, 10.0);
        assert_eq!(axis.driver().writes, 110);
        assert_eq!(delay.waited_ns, 110 * 15 * 1_000_000);

        let history = &axis.driver().history;
        assert_eq!(history[18], 1);
        // Held at the lower bound for the rest of the close ramp
        assert!(history[19..60].iter().all(|&a| a == 0));
        assert_eq!(history[59], 0);
        // Back into range after 40 steps up
        assert_eq!(history[100], 1);
        assert_eq!(axis.driver().last, Some(10));
    }

    #[test]
    fn test_toggle_target() {
        let config = ToggleConfig::default();
        assert_eq!(toggle_target(180.0, &config), 0.0);
        assert_eq!(toggle_target(120.0, &config), 0.0);
        assert_eq!(toggle_target(90.0, &config), 0.0);
        assert_eq!(toggle_target(30.0, &config), 180.0);
        assert_eq!(toggle_target(0.0, &config), 180.0);
    }
}
