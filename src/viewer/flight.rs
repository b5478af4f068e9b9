//! Marker-click flights and waypoint fly-throughs.

use web_time::Instant;

use crate::camera::CameraPose;
use crate::scene::SceneContext;
use crate::tile::{HeavyContentLoader, MetadataSource, TileId};

use super::MapViewer;

/// Upper bound on stored fly-through waypoints.
pub const MAX_WAYPOINTS: usize = 100;

impl<S, L, M> MapViewer<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    /// React to a click on a tile's marker: fly to the tile unless a
    /// flight is already running. Returns whether a flight started.
    pub fn click_marker(&mut self, id: TileId, now: Instant) -> bool {
        if self.disposed || self.flight.is_flying() {
            return false;
        }
        let camera = self.scene.camera();
        let (flight, device) = (&self.options.flight, self.options.device);
        let Some(to) = self
            .tiles
            .get(&id)
            .and_then(|tile| tile.flight_target(camera, flight, device))
        else {
            return false;
        };
        let from = camera.pose();
        let started =
            self.flight
                .start(from, to, self.options.flight.duration(), now);
        if started {
            log::debug!("{id}: flying to {:?}", to.target);
        }
        started
    }

    /// Advance the flight and chain the next fly-through leg when one
    /// completes.
    pub(super) fn advance_flight(&mut self, now: Instant) {
        let finished = self.flight.advance(now, self.scene.camera_mut());
        if finished {
            let _ = self.start_next_leg(now);
        }
    }

    // ── Waypoints ──

    /// Append the current camera pose as a waypoint. Returns `false` when
    /// the list is full.
    pub fn add_waypoint(&mut self) -> bool {
        if self.waypoints.len() >= MAX_WAYPOINTS {
            return false;
        }
        self.waypoints.push(self.scene.camera().pose());
        true
    }

    /// Replace the waypoint list (truncated to [`MAX_WAYPOINTS`]).
    pub fn set_waypoints(&mut self, waypoints: Vec<CameraPose>) {
        self.waypoints = waypoints;
        self.waypoints.truncate(MAX_WAYPOINTS);
    }

    /// Forget every waypoint. A running leg still completes.
    pub fn clear_waypoints(&mut self) {
        self.waypoints.clear();
        self.next_waypoint = None;
    }

    /// Stored waypoints in flight order.
    #[must_use]
    pub fn waypoints(&self) -> &[CameraPose] {
        &self.waypoints
    }

    /// Whether a fly-through sequence is running.
    #[must_use]
    pub const fn is_flying_through(&self) -> bool {
        self.next_waypoint.is_some()
    }

    /// Fly through every waypoint in order, one flight per leg. Returns
    /// `false` when a flight is already running or there are no waypoints.
    pub fn fly_through(&mut self, now: Instant) -> bool {
        if self.disposed || self.flight.is_flying() || self.waypoints.is_empty()
        {
            return false;
        }
        self.next_waypoint = Some(0);
        self.start_next_leg(now)
    }

    /// End the fly-through after the current leg.
    pub fn stop_fly_through(&mut self) {
        self.next_waypoint = None;
    }

    fn start_next_leg(&mut self, now: Instant) -> bool {
        let Some(index) = self.next_waypoint else {
            return false;
        };
        let Some(&to) = self.waypoints.get(index) else {
            self.next_waypoint = None;
            log::debug!("fly-through finished");
            return false;
        };
        self.next_waypoint = Some(index + 1);
        let from = self.scene.camera().pose();
        let duration = self.options.flight.duration();
        self.flight.start(from, to, duration, now)
    }
}
