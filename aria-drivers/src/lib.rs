//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the actuator traits
//! defined in aria-core, written against embedded-hal so any board can
//! supply the pins:
//!
//! - Stepper driver (STEP/DIR with an accelerating speed profile)
//! - Hobby servo driver (50 Hz PWM pulse width)

#![no_std]
#![deny(unsafe_code)]

pub mod servo;
pub mod stepper;
