//! RP2040 board glue
//!
//! Pin assignments for the arm controller board:
//!
//! | Function        | GPIO | PWM slice |
//! |-----------------|------|-----------|
//! | UART0 TX / RX   | 0/1  |           |
//! | Shoulder servo  | 2    | 1A        |
//! | Elbow servo     | 3    | 1B        |
//! | Wrist roll      | 4    | 2A        |
//! | Wrist pitch     | 5    | 2B        |
//! | Gripper servo   | 6    | 3A        |
//! | Base STEP       | 10   |           |
//! | Base DIR        | 11   |           |

use aria_core::config::ServoPulseConfig;
use aria_core::controller::Controller;
use aria_drivers::servo::PwmServo;
use aria_drivers::stepper::{AccelStepper, MicrosClock};
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, PwmOutput};
use embassy_time::{Delay, Instant};
use fixed::traits::ToFixed;

/// Servo channels the board exposes
pub const SERVO_COUNT: usize = 5;

/// System clock feeding the PWM slices
const SYS_CLOCK_HZ: u32 = 125_000_000;

/// PWM divider giving a 1.953125 MHz counter
const PWM_DIVIDER: u8 = 64;

/// Microsecond clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MicrosClock for EmbassyClock {
    fn now_us(&self) -> u32 {
        // Truncation gives the wrapping counter the driver expects
        Instant::now().as_micros() as u32
    }
}

pub type BaseStepper = AccelStepper<Output<'static>, Output<'static>, EmbassyClock, Delay>;
pub type JointServo = PwmServo<PwmOutput<'static>>;
pub type ArmController = Controller<BaseStepper, JointServo, Delay>;

/// PWM slice configuration producing the servo period
///
/// With the divider at 64 the counter runs at 1.953125 MHz, so a 20 ms
/// period needs `top = 39062`.
pub fn servo_pwm_config(servo: &ServoPulseConfig) -> PwmConfig {
    let top = SYS_CLOCK_HZ as u64 * servo.period_us as u64 / (PWM_DIVIDER as u64 * 1_000_000);

    let mut config = PwmConfig::default();
    config.divider = PWM_DIVIDER.to_fixed();
    config.top = top.min(u16::MAX as u64) as u16;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}
