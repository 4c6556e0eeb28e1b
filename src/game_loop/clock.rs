//! Rolling frame-rate measurement
//!
//! Diagnostics only; nothing here feeds back into the simulation.

use std::time::Duration;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Whole milliseconds in `nanos`, rounded down
pub fn nanos_to_millis(nanos: u64) -> u64 {
    nanos / NANOS_PER_MILLI
}

/// Averages over one completed window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frames: u32,
    pub millis_per_frame: u64,
    pub average_fps: f64,
}

/// Accumulates frame times over windows of a fixed number of frames
#[derive(Debug, Clone)]
pub struct FrameClock {
    window: u32,
    frames: u32,
    total: Duration,
}

impl FrameClock {
    /// One window is `window` frames (the target FPS gives one-second windows
    /// when the target is met)
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            total: Duration::ZERO,
        }
    }

    /// Record one frame. Returns the window's stats when it completes, then
    /// starts a new window.
    pub fn record(&mut self, elapsed: Duration) -> Option<FrameStats> {
        self.frames += 1;
        self.total += elapsed;
        if self.frames < self.window {
            return None;
        }

        let total_nanos = u64::try_from(self.total.as_nanos()).unwrap_or(u64::MAX);
        let secs = self.total.as_secs_f64();
        let stats = FrameStats {
            frames: self.frames,
            millis_per_frame: nanos_to_millis(total_nanos) / u64::from(self.frames),
            average_fps: if secs > 0.0 {
                f64::from(self.frames) / secs
            } else {
                f64::INFINITY
            },
        };
        self.frames = 0;
        self.total = Duration::ZERO;
        Some(stats)
    }
}
