//! Timing window of the active eased move

use super::ease;

/// Shared timing for all joints in a move
///
/// Times are monotonic milliseconds; elapsed time uses wrapping arithmetic
/// so a move spanning the `u32` rollover still completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionSession {
    start_ms: u32,
    duration_ms: u32,
    active: bool,
}

impl MotionSession {
    /// An inactive session
    pub const fn new() -> Self {
        Self {
            start_ms: 0,
            duration_ms: 0,
            active: false,
        }
    }

    /// Start timing a move, replacing any in progress
    pub fn arm(&mut self, now_ms: u32, duration_ms: u32) {
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
        self.active = true;
    }

    /// Mark the move complete
    pub fn finish(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Linear fraction of the move elapsed at `now_ms`
    pub fn elapsed(&self, now_ms: u32) -> f32 {
        ease::progress(now_ms.wrapping_sub(self.start_ms), self.duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_inactive() {
        assert!(!MotionSession::new().is_active());
    }

    #[test]
    fn test_elapsed() {
        let mut session = MotionSession::new();
        session.arm(1000, 500);
        assert!(session.is_active());
        assert_eq!(session.elapsed(1000), 0.0);
        assert_eq!(session.elapsed(1250), 0.5);
        assert_eq!(session.elapsed(1500), 1.0);
    }

    #[test]
    fn test_elapsed_across_rollover() {
        let mut session = MotionSession::new();
        session.arm(u32::MAX - 99, 1000);
        assert_eq!(session.elapsed(400), 0.5);
    }
}
