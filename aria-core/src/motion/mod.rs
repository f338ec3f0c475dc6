//! Joint model and time-based trajectory generation
//!
//! Converts a target pose plus a duration into per-tick joint positions
//! using a smoothstep ease.

pub mod ease;
pub mod joint;
pub mod session;
pub mod trajectory;

pub use ease::{progress, smoothstep};
pub use joint::{Clamp, Joint, JointKind};
pub use session::MotionSession;
pub use trajectory::{Armed, MotionError, Progress, Trajectory};
