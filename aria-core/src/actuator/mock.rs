//! Recording actuator fakes for tests

use embedded_hal::delay::DelayNs;

use crate::traits::{BoundedActuator, ContinuousActuator};

/// Stepper that jumps one step towards its target per service call
#[derive(Debug, Default)]
pub struct MockStepper {
    pub position: i32,
    pub target: i32,
    pub requests: u32,
    pub max_speed: f32,
    pub acceleration: f32,
}

impl ContinuousActuator for MockStepper {
    fn set_limits(&mut self, max_speed: f32, acceleration: f32) {
        self.max_speed = max_speed;
        self.acceleration = acceleration;
    }

    fn request_move(&mut self, target_steps: i32) {
        self.requests += 1;
        self.target = target_steps;
    }

    fn move_by(&mut self, delta_steps: i32) {
        self.target += delta_steps;
    }

    fn set_position(&mut self, steps: i32) {
        self.position = steps;
        self.target = steps;
    }

    fn service(&mut self) -> bool {
        if self.position == self.target {
            return false;
        }
        self.position += if self.target > self.position { 1 } else { -1 };
        true
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn target(&self) -> i32 {
        self.target
    }
}

/// Servo that remembers what it was told
#[derive(Debug, Default)]
pub struct MockServo {
    pub last: Option<u8>,
    pub writes: u32,
    pub history: heapless::Vec<u8, 256>,
}

impl BoundedActuator for MockServo {
    fn write(&mut self, angle: u8) {
        self.last = Some(angle);
        self.writes += 1;
        let _ = self.history.push(angle);
    }
}

/// Delay that only counts the time it was asked to wait
#[derive(Debug, Default)]
pub struct MockDelay {
    pub waited_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += ns as u64;
    }
}
