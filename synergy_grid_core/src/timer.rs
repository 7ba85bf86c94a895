use serde::{Deserialize, Serialize};

/// Countdown used by every resource, both for its life-span while on the grid
/// and for its cooldown while off it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    remaining: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts the countdown at `duration` ticks.
    pub fn set(&mut self, duration: u32) {
        self.remaining = duration;
    }

    /// Counts down one tick, stopping at zero.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.remaining == 0
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
