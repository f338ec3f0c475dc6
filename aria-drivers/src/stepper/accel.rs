//! STEP/DIR stepper driver with a constant-acceleration speed profile
//!
//! The step interval follows the recurrence from D. Austin, "Generate
//! stepper-motor speed profiles in real time" (2005):
//!
//! ```text
//! c0 = 0.676 * sqrt(2 / accel) * 1e6       first interval (us)
//! cn = cn-1 - 2 * cn-1 / (4n + 1)          each following interval
//! cmin = 1e6 / max_speed                   cruise floor
//! ```
//!
//! `n` counts steps into the ramp. A negative `n` means the motor is
//! decelerating, either to stop on target or to reverse. Retargeting mid-move
//! is always legal; the profile bends towards the new target without a
//! speed jump.
//!
//! Nothing here blocks except the STEP pulse itself, which is held for
//! `pulse_width_us` through the supplied delay.

use aria_core::traits::ContinuousActuator;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use libm::sqrtf;

use super::MicrosClock;

/// STEP and DIR outputs of one driver
#[derive(Debug)]
pub struct StepperPins<STEP, DIR> {
    pub step: STEP,
    pub dir: DIR,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Direction {
    /// Increasing position, DIR high
    Forward,
    /// Decreasing position, DIR low
    Reverse,
}

/// Accelerating STEP/DIR driver
pub struct AccelStepper<STEP, DIR, CLK, D> {
    pins: StepperPins<STEP, DIR>,
    clock: CLK,
    delay: D,
    pulse_width_us: u32,

    position: i32,
    target: i32,
    /// Signed speed in steps/s, positive when moving forward
    speed: f32,
    max_speed: f32,
    acceleration: f32,
    direction: Direction,

    /// Step counter along the current ramp
    n: i32,
    /// Initial step interval in microseconds
    c0: f32,
    /// Last step interval in microseconds
    cn: f32,
    /// Interval at max speed in microseconds
    cmin: f32,
    /// Interval to wait before the next pulse, 0 when stopped
    step_interval_us: u32,
    last_step_us: u32,
}

impl<STEP, DIR, CLK, D> AccelStepper<STEP, DIR, CLK, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    CLK: MicrosClock,
    D: DelayNs,
{
    /// Create a stopped driver at position 0
    ///
    /// Limits start at 1 step/s and 1 step/s²; call
    /// [`set_limits`](ContinuousActuator::set_limits) before moving.
    pub fn new(pins: StepperPins<STEP, DIR>, clock: CLK, delay: D, pulse_width_us: u32) -> Self {
        let mut stepper = Self {
            pins,
            clock,
            delay,
            pulse_width_us: pulse_width_us.max(1),
            position: 0,
            target: 0,
            speed: 0.0,
            max_speed: 0.0,
            acceleration: 0.0,
            direction: Direction::Forward,
            n: 0,
            c0: 0.0,
            cn: 0.0,
            cmin: 1.0,
            step_interval_us: 0,
            last_step_us: 0,
        };
        stepper.set_max_speed(1.0);
        stepper.set_acceleration(1.0);
        stepper
    }

    /// Current signed speed in steps/s
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Steps left to the target, signed
    pub fn distance_to_go(&self) -> i32 {
        self.target.wrapping_sub(self.position)
    }

    /// `true` while the motor is moving or has steps left
    pub fn is_running(&self) -> bool {
        self.speed != 0.0 || self.distance_to_go() != 0
    }

    /// Interval the next pulse waits for, 0 when stopped
    pub fn step_interval_us(&self) -> u32 {
        self.step_interval_us
    }

    /// Release the pins
    pub fn release(self) -> StepperPins<STEP, DIR> {
        self.pins
    }

    fn set_max_speed(&mut self, speed: f32) {
        let speed = if speed < 0.0 { -speed } else { speed };
        if speed <= 0.0 || speed == self.max_speed {
            return;
        }
        self.max_speed = speed;
        self.cmin = 1_000_000.0 / speed;
        // Recalculate the ramp position if already accelerating
        if self.n > 0 {
            self.n = self.steps_to_stop();
            self.compute_new_speed();
        }
    }

    fn set_acceleration(&mut self, acceleration: f32) {
        let acceleration = if acceleration < 0.0 {
            -acceleration
        } else {
            acceleration
        };
        if acceleration <= 0.0 || acceleration == self.acceleration {
            return;
        }
        if self.acceleration > 0.0 {
            self.n = (self.n as f32 * (self.acceleration / acceleration)) as i32;
        }
        self.c0 = 0.676 * sqrtf(2.0 / acceleration) * 1_000_000.0;
        self.acceleration = acceleration;
        self.compute_new_speed();
    }

    fn steps_to_stop(&self) -> i32 {
        ((self.speed * self.speed) / (2.0 * self.acceleration)) as i32
    }

    /// Work out the interval to the next step
    ///
    /// Called after every step and whenever the target or limits change.
    fn compute_new_speed(&mut self) {
        let distance = self.distance_to_go();
        let steps_to_stop = self.steps_to_stop();

        if distance == 0 && steps_to_stop <= 1 {
            // On target and slow enough to stop dead
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        if distance > 0 {
            if self.n > 0 {
                if steps_to_stop >= distance || self.direction == Direction::Reverse {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0 && steps_to_stop < distance && self.direction == Direction::Forward
            {
                self.n = -self.n;
            }
        } else if distance < 0 {
            if self.n > 0 {
                if steps_to_stop >= -distance || self.direction == Direction::Forward {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0 && steps_to_stop < -distance && self.direction == Direction::Reverse
            {
                self.n = -self.n;
            }
        }

        if self.n == 0 {
            // First step from rest
            self.cn = self.c0;
            self.direction = if distance > 0 {
                Direction::Forward
            } else {
                Direction::Reverse
            };
        } else {
            self.cn -= (2.0 * self.cn) / ((4 * self.n + 1) as f32);
            if self.cn < self.cmin {
                self.cn = self.cmin;
            }
        }
        self.n += 1;
        self.step_interval_us = self.cn as u32;
        self.speed = 1_000_000.0 / self.cn;
        if self.direction == Direction::Reverse {
            self.speed = -self.speed;
        }
    }

    /// Pulse once if the interval has elapsed
    fn run_speed(&mut self) -> bool {
        if self.step_interval_us == 0 {
            return false;
        }
        let now = self.clock.now_us();
        if now.wrapping_sub(self.last_step_us) < self.step_interval_us {
            return false;
        }

        self.position = match self.direction {
            Direction::Forward => self.position.wrapping_add(1),
            Direction::Reverse => self.position.wrapping_sub(1),
        };
        self.pulse();
        self.last_step_us = now;
        true
    }

    fn pulse(&mut self) {
        // Pin errors are not recoverable mid-profile; the position model
        // keeps counting either way
        let _ = match self.direction {
            Direction::Forward => self.pins.dir.set_high(),
            Direction::Reverse => self.pins.dir.set_low(),
        };
        let _ = self.pins.step.set_high();
        self.delay.delay_us(self.pulse_width_us);
        let _ = self.pins.step.set_low();
    }
}

impl<STEP, DIR, CLK, D> ContinuousActuator for AccelStepper<STEP, DIR, CLK, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    CLK: MicrosClock,
    D: DelayNs,
{
    fn set_limits(&mut self, max_speed: f32, acceleration: f32) {
        self.set_max_speed(max_speed);
        self.set_acceleration(acceleration);
    }

    fn request_move(&mut self, target_steps: i32) {
        if self.target != target_steps {
            self.target = target_steps;
            self.compute_new_speed();
        }
    }

    fn move_by(&mut self, delta_steps: i32) {
        self.request_move(self.target.wrapping_add(delta_steps));
    }

    fn set_position(&mut self, steps: i32) {
        self.position = steps;
        self.target = steps;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    fn service(&mut self) -> bool {
        let pulsed = self.run_speed();
        if pulsed {
            self.compute_new_speed();
        }
        pulsed
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn target(&self) -> i32 {
        self.target
    }
}
