//! The map viewer: owner of the tiles, the flight and the frame loop.
//!
//! ```
//! use splatmap::camera::Camera;
//! use splatmap::scene::{CanvasRect, StaticScene};
//! use splatmap::tile::{
//!     HeavyContentLoader, LoadCompletion, LoadRequest, StaticMetadataSource,
//! };
//! use splatmap::MapViewer;
//! use web_time::Instant;
//!
//! struct NoContent;
//! impl HeavyContentLoader for NoContent {
//!     fn create(&mut self, _: LoadRequest, _: LoadCompletion) {}
//! }
//!
//! let canvas = CanvasRect::sized(800.0, 600.0);
//! let scene = StaticScene::new(canvas, Camera::default());
//! let source = StaticMetadataSource::new().with("tiles/a.json", "{}");
//! let mut viewer = MapViewer::builder(scene, NoContent, source).build();
//!
//! let _ = viewer.register_tile("tiles/a.json");
//! let now = Instant::now();
//! if viewer.begin_frame(now) {
//!     // render here
//!     viewer.end_frame(now);
//! }
//! ```

mod builder;
mod flight;
mod queries;
mod tiles;

pub use builder::MapViewerBuilder;
pub use flight::MAX_WAYPOINTS;
use rustc_hash::FxHashMap;
use web_time::Instant;

use crate::animation::FlightAnimator;
use crate::camera::CameraPose;
use crate::options::Options;
use crate::picking::HybridPicker;
use crate::scene::SceneContext;
use crate::tile::{
    ActivationGate, FetchChannel, FrameContext, HeavyContentLoader,
    LoadChannel, MetadataSource, TileId, TileProxy,
};
use crate::util::frame_timing::FrameTiming;

/// Render-loop owner for a map of splat tiles.
///
/// Call [`begin_frame`](Self::begin_frame) before rendering and
/// [`end_frame`](Self::end_frame) after. Everything runs on the calling
/// thread; loaders and metadata sources hand their results back through
/// completion handles that are drained at the start of each frame.
pub struct MapViewer<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    scene: S,
    loader: L,
    source: M,
    options: Options,
    gate: ActivationGate,
    picker: HybridPicker,
    flight: FlightAnimator,
    tiles: FxHashMap<TileId, TileProxy>,
    urls: FxHashMap<String, TileId>,
    next_tile_id: u32,
    loads: LoadChannel,
    fetches: FetchChannel,
    timing: FrameTiming,
    frame_open: bool,
    waypoints: Vec<CameraPose>,
    next_waypoint: Option<usize>,
    disposed: bool,
}

impl<S, L, M> MapViewer<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    /// Start a builder around the host scene, content loader and metadata
    /// source.
    #[must_use]
    pub fn builder(
        scene: S,
        loader: L,
        source: M,
    ) -> MapViewerBuilder<S, L, M> {
        MapViewerBuilder::new(scene, loader, source)
    }

    // ── Frame loop ──

    /// Prepare a frame.
    ///
    /// Always drains pending completions and runs due releases. The
    /// per-frame update (flight, ranking, tile hooks) runs only when the
    /// frame interval has elapsed; returns whether it did.
    pub fn begin_frame(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        self.pump(now);
        if !self.timing.should_update(now) {
            return false;
        }
        self.timing.mark_updated(now);

        self.advance_flight(now);
        self.rank_tiles();

        let eye = self.scene.camera().eye;
        let frame = FrameContext {
            now,
            eye,
            options: &self.options,
            gate: &self.gate,
            loads: &self.loads,
        };
        for proxy in self.tiles.values_mut() {
            proxy.pre_render(&frame, &mut self.loader);
        }

        if self.options.residency.debug_mode() {
            let camera = self.scene.camera();
            log::debug!(
                "fps {:.1} eye {:?} target {:?} tiles {}",
                self.timing.fps(),
                camera.eye,
                camera.target,
                self.tiles.len()
            );
        }
        self.frame_open = true;
        true
    }

    /// Finish a frame started by a successful
    /// [`begin_frame`](Self::begin_frame); otherwise a no-op.
    pub fn end_frame(&mut self, now: Instant) {
        if !std::mem::take(&mut self.frame_open) {
            return;
        }
        for proxy in self.tiles.values_mut() {
            proxy.post_render(now, &self.options.residency);
        }
    }

    /// Deliver completions and fire due releases without a full update.
    fn pump(&mut self, now: Instant) {
        for doc in self.fetches.drain() {
            self.apply_document(doc);
        }
        for loaded in self.loads.drain() {
            let Some(proxy) = self.tiles.get_mut(&loaded.tile()) else {
                // Dropping the completion disposes its content.
                continue;
            };
            let ticket = loaded.ticket();
            if let Some(content) = loaded.into_content() {
                proxy.on_content_loaded(ticket, content);
            }
        }
        for proxy in self.tiles.values_mut() {
            let _ = proxy.run_scheduled_release(now, &self.options.residency);
        }
    }

    // ── Teardown ──

    /// Dispose every tile and stop any flight. Idempotent. Completions
    /// arriving afterwards dispose their content.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.flight.cancel();
        self.next_waypoint = None;
        for proxy in self.tiles.values_mut() {
            proxy.dispose();
        }
        self.tiles.clear();
        self.urls.clear();
        // Queued completions have no tile left; dropping them disposes.
        drop(self.loads.drain());
        log::info!("map viewer disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── Accessors ──

    /// Viewer options.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// The host scene.
    #[must_use]
    pub const fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable host scene (camera controls write through here).
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// The content loader.
    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Mutable content loader.
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// The camera flight animator.
    #[must_use]
    pub const fn flight(&self) -> &FlightAnimator {
        &self.flight
    }

    /// Smoothed update rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }
}

impl<S, L, M> Drop for MapViewer<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests;
