//! Pass and frame timing.
//!
//! Provides an RAII scope that reports each compute pass at `trace` level and
//! a frame timer with a smoothed average.
use std::time::Instant;

use tracing::trace;

/// A profiling scope that measures elapsed time using RAII.
///
/// The elapsed time is reported through `tracing` when the scope is dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!(pass = self.name, elapsed_ms = self.elapsed_ms(), "pass complete");
    }
}

/// Frame timer with an exponentially smoothed average.
pub struct FrameTimer {
    last_frame_time_ms: f64,
    average_ms: Option<f64>,
}

impl FrameTimer {
    /// Weight of the newest sample in the running average
    const SMOOTHING: f64 = 0.05;

    /// Creates a new frame timer.
    pub fn new() -> Self {
        Self {
            last_frame_time_ms: 0.0,
            average_ms: None,
        }
    }

    /// Records frame time in milliseconds.
    pub fn record(&mut self, time_ms: f64) {
        self.last_frame_time_ms = time_ms;
        self.average_ms = Some(match self.average_ms {
            None => time_ms,
            Some(avg) => time_ms * Self::SMOOTHING + avg * (1.0 - Self::SMOOTHING),
        });
    }

    /// Gets the last recorded frame time.
    pub fn last_frame_time_ms(&self) -> f64 {
        self.last_frame_time_ms
    }

    /// Smoothed frame time, zero before the first sample
    pub fn average_ms(&self) -> f64 {
        self.average_ms.unwrap_or(0.0)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_profiler_scope_measures_time() {
        let scope = ProfilerScope::new("test");
        thread::sleep(Duration::from_millis(10));
        let elapsed = scope.elapsed_ms();
        assert!(elapsed >= 10.0, "Expected at least 10ms, got {elapsed}");
    }

    #[test]
    fn test_frame_timer() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.last_frame_time_ms(), 0.0);
        assert_eq!(timer.average_ms(), 0.0);

        timer.record(20.0);
        assert_eq!(timer.last_frame_time_ms(), 20.0);
        assert_eq!(timer.average_ms(), 20.0);

        timer.record(40.0);
        assert_eq!(timer.last_frame_time_ms(), 40.0);
        assert!((timer.average_ms() - 21.0).abs() < 1e-9);
    }
}
