//! Hobby servo on a PWM channel
//!
//! The angle maps linearly onto a pulse width between `min_pulse_us` (0°)
//! and `max_pulse_us` (180°), repeated every `period_us`. The channel must
//! already be running at that period; this driver only sets the duty.
//!
//! # Usage
//!
//! ```ignore
//! let mut servo = PwmServo::new(pwm_channel, &ServoPulseConfig::default());
//! servo.write(90); // 1472 us pulse
//! ```

use aria_core::actuator::servo::SERVO_MAX_DEG;
use aria_core::config::ServoPulseConfig;
use aria_core::traits::BoundedActuator;
use embedded_hal::pwm::SetDutyCycle;

/// Angle-to-pulse servo driver
pub struct PwmServo<P> {
    pwm: P,
    config: ServoPulseConfig,
    angle: Option<u8>,
    /// Duty writes the channel rejected
    faults: u32,
}

impl<P: SetDutyCycle> PwmServo<P> {
    /// Wrap a PWM channel; nothing is written until the first angle
    pub fn new(pwm: P, config: &ServoPulseConfig) -> Self {
        Self {
            pwm,
            config: *config,
            angle: None,
            faults: 0,
        }
    }

    /// Pulse width in microseconds for an angle, clamped to 0..=180
    pub fn pulse_us(&self, angle: u8) -> u16 {
        let angle = angle.min(SERVO_MAX_DEG) as u32;
        let min = self.config.min_pulse_us as u32;
        let max = self.config.max_pulse_us as u32;
        let span = max.saturating_sub(min);
        (min + span * angle / SERVO_MAX_DEG as u32) as u16
    }

    /// Last angle written, if any
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn config(&self) -> &ServoPulseConfig {
        &self.config
    }

    /// Release the PWM channel
    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> BoundedActuator for PwmServo<P> {
    fn write(&mut self, angle: u8) {
        let angle = angle.min(SERVO_MAX_DEG);
        let pulse = self.pulse_us(angle);
        match self
            .pwm
            .set_duty_cycle_fraction(pulse, self.config.period_us.max(1))
        {
            Ok(()) => self.angle = Some(angle),
            Err(_) => self.faults = self.faults.wrapping_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{ErrorKind, ErrorType};

    /// 50 Hz slice as configured on the RP2040 (top = 39062)
    struct FakePwm {
        duty: u16,
        fail: bool,
    }

    #[derive(Debug)]
    struct FakeError;

    impl embedded_hal::pwm::Error for FakeError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for FakePwm {
        type Error = FakeError;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            39_062
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), FakeError> {
            if self.fail {
                return Err(FakeError);
            }
            self.duty = duty;
            Ok(())
        }
    }

    fn servo() -> PwmServo<FakePwm> {
        PwmServo::new(
            FakePwm {
                duty: 0,
                fail: false,
            },
            &ServoPulseConfig::default(),
        )
    }

    #[test]
    fn test_pulse_mapping() {
        let s = servo();
        assert_eq!(s.pulse_us(0), 544);
        assert_eq!(s.pulse_us(90), 1472);
        assert_eq!(s.pulse_us(180), 2400);
        assert_eq!(s.pulse_us(200), 2400);
    }

    #[test]
    fn test_write_sets_duty_fraction() {
        let mut s = servo();
        assert_eq!(s.angle(), None);
        s.write(90);
        assert_eq!(s.angle(), Some(90));
        // 1472 / 20000 of 39062
        assert_eq!(s.release().duty, 2874);
    }

    #[test]
    fn test_endpoints() {
        let mut s = servo();
        s.write(0);
        assert_eq!(s.pwm.duty, 1062);
        s.write(180);
        assert_eq!(s.pwm.duty, 4687);
    }

    #[test]
    fn test_custom_range() {
        let config = ServoPulseConfig {
            min_pulse_us: 1000,
            max_pulse_us: 2000,
            period_us: 20_000,
        };
        let s = PwmServo::new(
            FakePwm {
                duty: 0,
                fail: false,
            },
            &config,
        );
        assert_eq!(s.pulse_us(45), 1250);
    }

    #[test]
    fn test_rejected_write_counts_fault() {
        let mut s = PwmServo::new(
            FakePwm {
                duty: 7,
                fail: true,
            },
            &ServoPulseConfig::default(),
        );
        s.write(45);
        s.write(46);
        assert_eq!(s.faults(), 2);
        assert_eq!(s.angle(), None);
        assert_eq!(s.release().duty, 7);
    }
}
