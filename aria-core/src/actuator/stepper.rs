//! Continuous joint driven through a stepper driver

use super::Actuator;
use crate::motion::Joint;
use crate::traits::ContinuousActuator;

/// Degrees-to-steps adapter around a [`ContinuousActuator`]
#[derive(Debug)]
pub struct StepperAxis<C> {
    driver: C,
    steps_per_degree: f32,
}

impl<C: ContinuousActuator> StepperAxis<C> {
    pub fn new(driver: C, steps_per_degree: f32) -> Self {
        Self {
            driver,
            steps_per_degree,
        }
    }

    pub fn steps_per_degree(&self) -> f32 {
        self.steps_per_degree
    }

    /// Step count for an angle, truncated toward zero
    pub fn steps_for(&self, degrees: f32) -> i32 {
        // Saturating cast
        (degrees * self.steps_per_degree) as i32
    }

    /// Angle that [`steps_for`](Self::steps_for) maps back onto `steps`
    ///
    /// Half a step past `steps`, away from zero, so truncation cannot land
    /// on the neighbouring step.
    pub fn degrees_at(&self, steps: i32) -> f32 {
        let half = match steps {
            s if s > 0 => 0.5,
            s if s < 0 => -0.5,
            _ => 0.0,
        };
        (steps as f32 + half) / self.steps_per_degree
    }

    pub fn driver(&self) -> &C {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut C {
        &mut self.driver
    }
}

impl<C: ContinuousActuator> Actuator for StepperAxis<C> {
    fn service(&mut self) -> bool {
        self.driver.service()
    }

    fn drive(&mut self, joint: &Joint) {
        let steps = self.steps_for(joint.current);
        self.driver.request_move(steps);
    }

    fn hold(&mut self, _joint: &Joint) {
        // The driver keeps running to its last target from `service`
    }
}
