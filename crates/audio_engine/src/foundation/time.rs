//! Time management utilities
//!
//! Music fades are driven by wall-clock time rather than frame counts, so
//! everything that measures a fade goes through the [`Clock`] trait.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic elapsed-time source
pub trait Clock {
    /// Reset the elapsed time to zero and keep counting
    fn restart(&mut self);

    /// Time elapsed since the last restart (or creation)
    fn elapsed(&self) -> Duration;
}

/// Simple stopwatch for measuring elapsed time
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start_new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch (no-op while running)
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Reset the stopwatch to zero
    pub fn reset(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    /// Restart the stopwatch (reset and start)
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = if let Some(start) = self.start_time {
            start.elapsed()
        } else {
            Duration::ZERO
        };
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

impl Clock for Stopwatch {
    fn restart(&mut self) {
        Stopwatch::restart(self);
    }

    fn elapsed(&self) -> Duration {
        Stopwatch::elapsed(self)
    }
}

/// Hand-driven clock
///
/// Clones share the same "now", so a test (or a host with its own timeline)
/// can keep one copy and advance it while another copy lives inside a
/// crossfader. Single-threaded only.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    started_at: Duration,
}

impl ManualClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the shared time forward
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Current shared time
    pub fn now(&self) -> Duration {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn restart(&mut self) {
        self.started_at = self.now.get();
    }

    fn elapsed(&self) -> Duration {
        self.now.get().saturating_sub(self.started_at)
    }
}
