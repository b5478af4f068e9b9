//! Camera flights: timed interpolation of eye position and look-at target.

use web_time::{Duration, Instant};

use crate::camera::{Camera, CameraPose};
use crate::options::FlightOptions;
use crate::util::easing::EasingFunction;

/// One flight in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightState {
    /// Pose at the start of the flight.
    pub from: CameraPose,
    /// Pose the flight ends at.
    pub to: CameraPose,
    /// When the flight started.
    pub start: Instant,
    /// Total flight time.
    pub duration: Duration,
    /// Easing applied to the raw progress.
    pub easing: EasingFunction,
}

impl FlightState {
    /// Raw progress in `[0, 1]`; a zero duration is complete immediately.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Interpolated pose at `now`. The end pose is returned exactly once
    /// progress reaches one.
    #[must_use]
    pub fn pose_at(&self, now: Instant) -> CameraPose {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, self.easing.evaluate(t))
    }
}

/// Drives at most one flight at a time.
///
/// `Idle -> InFlight -> Idle`. A flight cannot be interrupted by another
/// one; [`cancel`](Self::cancel) exists for viewer teardown.
#[derive(Debug, Clone)]
pub struct FlightAnimator {
    state: Option<FlightState>,
    easing: EasingFunction,
    min_height: f32,
}

impl Default for FlightAnimator {
    fn default() -> Self {
        Self::new(&FlightOptions::default())
    }
}

impl FlightAnimator {
    /// Idle animator using the configured easing and height floor.
    #[must_use]
    pub fn new(options: &FlightOptions) -> Self {
        Self {
            state: None,
            easing: options.easing,
            min_height: options.min_height,
        }
    }

    /// Whether a flight is in progress.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.state.is_some()
    }

    /// The flight in progress, if any.
    #[must_use]
    pub const fn state(&self) -> Option<&FlightState> {
        self.state.as_ref()
    }

    /// Start a flight. Returns `false` (and changes nothing) while another
    /// flight is in progress.
    pub fn start(
        &mut self,
        from: CameraPose,
        to: CameraPose,
        duration: Duration,
        now: Instant,
    ) -> bool {
        if self.state.is_some() {
            return false;
        }
        self.state = Some(FlightState {
            from,
            to,
            start: now,
            duration,
            easing: self.easing,
        });
        true
    }

    /// Write the pose for `now` into `camera`, keeping the eye above the
    /// height floor. Returns `true` when this call completed the flight.
    pub fn advance(&mut self, now: Instant, camera: &mut Camera) -> bool {
        let Some(state) = &self.state else {
            return false;
        };
        let mut pose = state.pose_at(now);
        let done = state.progress(now) >= 1.0;
        pose.position.y = pose.position.y.max(self.min_height);
        camera.set_pose(pose);
        if done {
            self.state = None;
        }
        done
    }

    /// Drop the flight in progress without touching the camera.
    pub fn cancel(&mut self) {
        self.state = None;
    }
}
