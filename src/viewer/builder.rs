use rustc_hash::FxHashMap;

use super::MapViewer;
use crate::animation::FlightAnimator;
use crate::options::Options;
use crate::picking::HybridPicker;
use crate::scene::SceneContext;
use crate::tile::{
    ActivationGate, FetchChannel, HeavyContentLoader, LoadChannel,
    MetadataSource,
};
use crate::util::frame_timing::FrameTiming;

/// Fluent builder for [`MapViewer`].
pub struct MapViewerBuilder<S, L, M> {
    scene: S,
    loader: L,
    source: M,
    options: Options,
    tiles: Vec<String>,
    scene_indexes: Vec<String>,
}

impl<S, L, M> MapViewerBuilder<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    pub(super) fn new(scene: S, loader: L, source: M) -> Self {
        Self {
            scene,
            loader,
            source,
            options: Options::default(),
            tiles: Vec::new(),
            scene_indexes: Vec::new(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Register a tile metadata URL on build.
    #[must_use]
    pub fn with_tile(mut self, url: impl Into<String>) -> Self {
        self.tiles.push(url.into());
        self
    }

    /// Fetch a scene index document on build.
    #[must_use]
    pub fn with_scene_index(mut self, url: impl Into<String>) -> Self {
        self.scene_indexes.push(url.into());
        self
    }

    /// Consume the builder and produce a [`MapViewer`].
    #[must_use]
    pub fn build(self) -> MapViewer<S, L, M> {
        let options = self.options;
        log::info!(
            "map viewer: {:?}, near cutoff {}, debug {}",
            options.device,
            options.activation.near_cutoff(options.device),
            options.residency.debug_mode()
        );
        let mut viewer = MapViewer {
            scene: self.scene,
            loader: self.loader,
            source: self.source,
            gate: ActivationGate::new(&options.activation),
            picker: HybridPicker::new(&options.picking),
            flight: FlightAnimator::new(&options.flight),
            timing: FrameTiming::new(options.residency.frame_interval()),
            options,
            tiles: FxHashMap::default(),
            urls: FxHashMap::default(),
            next_tile_id: 0,
            loads: LoadChannel::default(),
            fetches: FetchChannel::default(),
            frame_open: false,
            waypoints: Vec::new(),
            next_waypoint: None,
            disposed: false,
        };
        for url in &self.tiles {
            let _ = viewer.register_tile(url);
        }
        for url in &self.scene_indexes {
            viewer.add_scene_index(url);
        }
        viewer
    }
}
