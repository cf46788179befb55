//! Phase-locked playback clock for one echo
//!
//! Sample `i` is due `offset_i - offset_0` seconds after its repetition
//! starts. A repetition lasts `max(cycle_duration, last due)`; overshoot at the
//! end of a repetition carries into the next so consecutive starts are exactly
//! one repetition length apart.

use crate::constants::MIN_CYCLE_DURATION;
use crate::recording::{Recording, Sample};

#[derive(Debug, Clone)]
pub struct PlaybackTimeline {
    samples: Vec<Sample>,
    cycle_duration: f32,
    /// Next sample to apply in the current repetition
    cursor: usize,
    /// Seconds since the current repetition started
    cycle_clock: f32,
    /// Seconds since the first tick
    total_elapsed: f32,
    /// `total_elapsed` at the start of the current repetition
    repetition_start: f32,
    repetitions: u32,
    started: bool,
}

impl PlaybackTimeline {
    pub fn new(recording: Recording, cycle_duration: f32) -> Self {
        Self {
            samples: recording.into_samples(),
            cycle_duration: cycle_duration.max(MIN_CYCLE_DURATION),
            cursor: 0,
            cycle_clock: 0.0,
            total_elapsed: 0.0,
            repetition_start: 0.0,
            repetitions: 0,
            started: false,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn cycle_duration(&self) -> f32 {
        self.cycle_duration
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cycle_clock(&self) -> f32 {
        self.cycle_clock
    }

    /// Completed repetitions
    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    /// Timeline time at which the current repetition began
    pub fn repetition_start(&self) -> f32 {
        self.repetition_start
    }

    pub fn total_elapsed(&self) -> f32 {
        self.total_elapsed
    }

    fn due_at(&self, index: usize) -> f32 {
        self.samples[index].offset - self.samples[0].offset
    }

    pub fn repetition_length(&self) -> f32 {
        let last_due = if self.samples.is_empty() {
            0.0
        } else {
            self.due_at(self.samples.len() - 1)
        };
        self.cycle_duration.max(last_due)
    }

    /// Wait scheduled after applying sample `index`: the gap to the next
    /// sample's due time, or the fill to the repetition length for the last
    /// one. Never negative. The waits of one repetition sum to
    /// [`Self::repetition_length`].
    pub fn wait_after(&self, index: usize) -> f32 {
        if index >= self.samples.len() {
            return 0.0;
        }
        let next = if index + 1 < self.samples.len() {
            self.due_at(index + 1)
        } else {
            self.repetition_length()
        };
        (next - self.due_at(index)).max(0.0)
    }

    /// Advance by one tick, handing every sample that falls due to `apply`
    /// in order. The first call runs at clock 0 regardless of `dt`.
    pub fn advance(&mut self, dt: f32, mut apply: impl FnMut(&Sample)) {
        if self.started {
            let dt = dt.max(0.0);
            self.cycle_clock += dt;
            self.total_elapsed += dt;
        } else {
            self.started = true;
        }

        let length = self.repetition_length();
        loop {
            while self.cursor < self.samples.len() && self.due_at(self.cursor) <= self.cycle_clock {
                apply(&self.samples[self.cursor]);
                self.cursor += 1;
            }

            if self.cursor < self.samples.len() || self.cycle_clock < length {
                break;
            }

            self.cycle_clock -= length;
            self.cursor = 0;
            self.repetitions += 1;
            self.repetition_start = self.total_elapsed - self.cycle_clock;
        }
    }
}
