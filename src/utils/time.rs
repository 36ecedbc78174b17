#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Timer for tracking frame timing and elapsed time.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the timer by one frame. Call once per rendered frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
        self.frame_time()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Snapshot of the most recent tick.
    #[must_use]
    pub fn frame_time(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed,
            delta: self.delta,
        }
    }
}

/// Clock values for a single frame.
///
/// Everything time-dependent in the book (settle steps, turning envelope,
/// damping) reads from this instead of a wall clock, so a frame sequence can
/// be replayed deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Time since the book clock started.
    pub elapsed: Duration,
    /// Time since the previous frame.
    pub delta: Duration,
}

impl FrameTime {
    #[must_use]
    pub fn new(elapsed: Duration, delta: Duration) -> Self {
        Self { elapsed, delta }
    }

    /// Builds the next frame `delta` after this one.
    #[must_use]
    pub fn advance(self, delta: Duration) -> Self {
        Self {
            elapsed: self.elapsed + delta,
            delta,
        }
    }

    #[inline]
    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

impl From<&Timer> for FrameTime {
    fn from(timer: &Timer) -> Self {
        timer.frame_time()
    }
}
