//! Per-joint position state

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Range behaviour of a joint
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JointKind {
    /// Unbounded, driven in steps (the base)
    Continuous,
    /// Limited to `[min, max]` degrees, driven as an angle
    Bounded { min: f32, max: f32 },
}

impl JointKind {
    /// Clamp an angle into this joint's range
    pub fn clamp(&self, degrees: f32) -> f32 {
        match *self {
            JointKind::Continuous => degrees,
            JointKind::Bounded { min, max } => degrees.max(min).min(max),
        }
    }

    /// Check if this is the continuous kind
    pub fn is_continuous(&self) -> bool {
        matches!(self, JointKind::Continuous)
    }
}

/// A requested angle that had to be clamped
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Clamp {
    pub joint: u8,
    pub requested: f32,
    pub applied: f32,
}

/// One controllable axis
///
/// `start` and `target` bound the active eased move; `current` is what the
/// actuator is being told right now.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Joint {
    pub id: u8,
    pub kind: JointKind,
    pub current: f32,
    pub start: f32,
    pub target: f32,
}

impl Joint {
    /// Create a joint resting at `home`
    pub fn new(id: u8, kind: JointKind, home: f32) -> Self {
        let home = kind.clamp(home);
        Self {
            id,
            kind,
            current: home,
            start: home,
            target: home,
        }
    }

    /// Begin a move from wherever the joint is now
    pub fn arm(&mut self, target: f32) -> Option<Clamp> {
        self.start = self.current;
        self.target = self.kind.clamp(target);
        self.clamp_report(target, self.target)
    }

    /// Jump straight to an angle; an active move holds it there
    pub fn set_immediate(&mut self, value: f32) -> Option<Clamp> {
        let applied = self.kind.clamp(value);
        self.current = applied;
        self.start = applied;
        self.target = applied;
        self.clamp_report(value, applied)
    }

    /// Shift every position by `delta` degrees
    pub fn shift(&mut self, delta: f32) {
        self.current += delta;
        self.start += delta;
        self.target += delta;
    }

    /// Place the joint at eased fraction `k` of its move
    pub fn interpolate(&mut self, k: f32) {
        // Re-clamp so float rounding cannot step past a bound
        self.current = self.kind.clamp(self.start + (self.target - self.start) * k);
    }

    /// Snap onto the target
    pub fn settle(&mut self) {
        self.current = self.target;
    }

    fn clamp_report(&self, requested: f32, applied: f32) -> Option<Clamp> {
        if requested != applied {
            Some(Clamp {
                joint: self.id,
                requested,
                applied,
            })
        } else {
            None
        }
    }
}
