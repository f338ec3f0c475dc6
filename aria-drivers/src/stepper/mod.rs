//! Stepper motor drivers

pub mod accel;

pub use accel::{AccelStepper, StepperPins};

/// Free-running microsecond counter
///
/// The value is expected to wrap at `u32::MAX`; drivers only ever compare
/// differences.
pub trait MicrosClock {
    fn now_us(&self) -> u32;
}

impl<T: MicrosClock> MicrosClock for &T {
    fn now_us(&self) -> u32 {
        (*self).now_us()
    }
}
