//! Idle/Moving state machine
//!
//! The only thing the control loop needs to know between ticks is whether
//! an eased move is running. Immediate commands never change the state.

/// Controller motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Joints holding their positions
    #[default]
    Idle,
    /// An eased move is in progress
    Moving,
}

/// Events that drive [`MotionState`] transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionEvent {
    /// A move was armed (from either state)
    Armed,
    /// The active move reached its targets
    Finished,
}

impl MotionState {
    /// Apply an event and return the new state
    pub fn transition(self, event: MotionEvent) -> Self {
        match (self, event) {
            (_, MotionEvent::Armed) => MotionState::Moving,
            (MotionState::Moving, MotionEvent::Finished) => MotionState::Idle,
            _ => self,
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self, MotionState::Moving)
    }
}
