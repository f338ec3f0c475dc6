//! Bounded joint driven through a hobby servo

use super::Actuator;
use crate::motion::Joint;
use crate::traits::BoundedActuator;

/// Widest range a hobby servo accepts
pub const SERVO_MAX_DEG: u8 = 180;

/// Angle adapter around a [`BoundedActuator`]
#[derive(Debug)]
pub struct ServoAxis<B> {
    driver: B,
    min: u8,
    max: u8,
}

impl<B: BoundedActuator> ServoAxis<B> {
    /// Wrap a driver limited to `[min_deg, max_deg]`, itself within `0..=180`
    pub fn new(driver: B, min_deg: f32, max_deg: f32) -> Self {
        let min = clamp_deg(min_deg);
        let max = clamp_deg(max_deg).max(min);
        Self { driver, min, max }
    }

    /// Whole-degree angle `degrees` would be written as
    pub fn clamp_angle(&self, degrees: f32) -> u8 {
        clamp_deg(degrees).max(self.min).min(self.max)
    }

    /// Command an angle, truncating the fraction and clamping into range
    pub fn write_angle(&mut self, degrees: f32) -> u8 {
        let angle = self.clamp_angle(degrees);
        self.driver.write(angle);
        angle
    }

    pub fn driver(&self) -> &B {
        &self.driver
    }
}

fn clamp_deg(degrees: f32) -> u8 {
    // Truncate first, as the servo only takes whole degrees
    (degrees as i32).max(0).min(SERVO_MAX_DEG as i32) as u8
}

impl<B: BoundedActuator> Actuator for ServoAxis<B> {
    fn service(&mut self) -> bool {
        false
    }

    fn drive(&mut self, joint: &Joint) {
        self.write_angle(joint.current);
    }

    fn hold(&mut self, joint: &Joint) {
        self.write_angle(joint.current);
    }
}
