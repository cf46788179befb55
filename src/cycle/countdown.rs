//! Cycle countdown - the recording window of one cycle
//!
//! Advanced by the orchestrator each tick; discarded on early stop.

/// Elapsed/total seconds of the running cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleCountdown {
    elapsed: f32,
    duration: f32,
}

impl CycleCountdown {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance by `dt`. Returns true once the full duration has elapsed.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Whole seconds left, rounded up (10, 9, ... 1, then 0)
    pub fn display_number(&self) -> u32 {
        self.remaining().ceil() as u32
    }

    /// 0.0 at start, 1.0 when finished
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}
