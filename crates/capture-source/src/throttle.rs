//! Paces grabs to the host's frame rate from per-tick elapsed time.
//!

use core::time::Duration;
use std::time::Instant;

use tracing::info;
use utilities::display_duration;

use crate::FrameRate;

/// The frame rate assumed when the host doesn't report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Returns the frames per second for `rate`, or `fallback_fps` if the rate is unknown.
pub fn target_fps(rate: Option<FrameRate>, fallback_fps: f64) -> f64 {
    rate.and_then(FrameRate::fps).unwrap_or(fallback_fps)
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome<E> {
    /// Not enough time accumulated for a grab.
    Idle,

    /// A grab was attempted and succeeded.
    Grabbed,

    /// A grab was attempted and failed.
    Failed(E),
}

/// The number of grabs over a reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabReport {
    /// Successful grabs in the window.
    pub frames: u32,

    /// The length of the window.
    pub elapsed: Duration,
}

/// Accumulates elapsed time and releases at most one grab per tick, each grab consuming exactly
/// one frame interval.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    accumulated: f64,
    grab_count: u32,
    window_start: Instant,
    report_interval: Duration,
}

impl FrameThrottle {
    /// Create a throttle with an empty accumulator whose report window starts at `now`.
    pub fn new(now: Instant, report_interval: Duration) -> Self {
        Self {
            accumulated: 0.0,
            grab_count: 0,
            window_start: now,
            report_interval,
        }
    }

    /// Advance by `delta_seconds` at `fps`, calling `grab` if a frame interval has accumulated.
    ///
    /// The accumulator loses one interval per attempt whether or not `grab` succeeds. Excess time
    /// carries over, capped at one further pending grab.
    pub fn tick<E, F>(&mut self, delta_seconds: f64, fps: f64, now: Instant, grab: F) -> TickOutcome<E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        let interval = 1.0 / fps;
        if !(interval.is_finite() && interval > 0.0) {
            return TickOutcome::Idle;
        }

        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.accumulated += delta_seconds;
        }

        if let Some(report) = self.poll_report(now) {
            info!(
                frames = report.frames,
                target_fps = fps,
                "Captured {} frames in the last {} (target ~{fps:.2} FPS)",
                report.frames,
                display_duration(report.elapsed)
            );
        }

        if self.accumulated < interval {
            return TickOutcome::Idle;
        }

        let outcome = match grab() {
            Ok(()) => {
                self.grab_count += 1;
                TickOutcome::Grabbed
            }
            Err(error) => TickOutcome::Failed(error),
        };

        self.accumulated = (self.accumulated - interval).clamp(0.0, interval);

        outcome
    }

    /// Returns the grab count for the current window and starts a new one if the report interval
    /// has passed.
    pub fn poll_report(&mut self, now: Instant) -> Option<GrabReport> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.report_interval {
            return None;
        }

        let report = GrabReport {
            frames: self.grab_count,
            elapsed,
        };

        self.grab_count = 0;
        self.window_start = now;

        Some(report)
    }

    /// The accumulated time in seconds.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Successful grabs in the current report window.
    pub fn grab_count(&self) -> u32 {
        self.grab_count
    }
}
