//! Configuration types and loading
//!
//! The firmware embeds `arm.toml` and reads it at boot with [`parse_config`];
//! anything it does not set keeps the defaults in [`ArmConfig::default`].

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
