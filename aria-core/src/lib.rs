//! Board-agnostic core logic for the arm controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Joint model and time-based eased trajectories
//! - Actuator traits and per-joint drive selection
//! - Command dispatch and the per-tick control loop
//! - Configuration types, defaults and a small TOML reader

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod config;
pub mod controller;
pub mod motion;
pub mod traits;

pub use aria_protocol::MAX_JOINTS;
