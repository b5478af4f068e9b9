//! Frame throttling and update-rate tracking.

use web_time::{Duration, Instant};

/// Frame throttle with smoothed FPS tracking.
///
/// The viewer only runs its update when at least `min_interval` has passed
/// since the previous update; frames arriving sooner are skipped.
pub struct FrameTiming {
    /// Minimum time between two updates (zero = unlimited).
    min_interval: Duration,
    /// Timestamp of the last update, `None` before the first one.
    last_update: Option<Instant>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new throttle with the given minimum update interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_update: None,
            smoothed_fps: 30.0,
            smoothing: 0.05,
        }
    }

    /// Whether enough time has passed since the last update to run another.
    pub fn should_update(&self, now: Instant) -> bool {
        self.last_update.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.min_interval
        })
    }

    /// Record that an update ran at `now`.
    pub fn mark_updated(&mut self, now: Instant) {
        if let Some(last) = self.last_update {
            let frame_time = now.saturating_duration_since(last).as_secs_f32();
            if frame_time > 0.0 {
                let instant_fps = 1.0 / frame_time;
                self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                    + instant_fps * self.smoothing;
            }
        }
        self.last_update = Some(now);
    }

    /// Get the current update rate (smoothed).
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}
