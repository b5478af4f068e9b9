//! Headless demo: drives a small splat map through a marker-click flight
//! and a fly-away on a simulated clock, logging what the viewer does.
//!
//! Usage: `splatmap [options.toml]`. Run with `RUST_LOG=debug` to see the
//! per-tile lifecycle.

use std::path::Path;

use glam::Vec3;
use splatmap::camera::{Camera, CameraPose};
use splatmap::scene::{CanvasRect, SceneQuery, StaticScene};
use splatmap::tile::{
    HeavyContent, HeavyContentLoader, LoadCompletion, LoadRequest,
    ModelDescriptor, StaticMetadataSource, TileMetadata,
};
use splatmap::{MapViewer, Options};
use web_time::{Duration, Instant};

type DemoViewer = MapViewer<StaticScene, GridLoader, StaticMetadataSource>;

/// Simulated frame period.
const STEP: Duration = Duration::from_millis(33);

/// Point cloud standing in for real splat content: a flat grid around the
/// tile origin.
struct GridContent {
    points: Vec<f32>,
    visible: bool,
    url: String,
}

impl GridContent {
    fn new(origin: Vec3) -> Self {
        let mut points = Vec::with_capacity(11 * 11 * 3);
        for i in -5..=5 {
            for j in -5..=5 {
                points.extend_from_slice(&[
                    origin.x + i as f32 * 0.1,
                    origin.y,
                    origin.z + j as f32 * 0.1,
                ]);
            }
        }
        Self {
            points,
            visible: false,
            url: String::new(),
        }
    }
}

impl HeavyContent for GridContent {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn add_model(&mut self, model: &ModelDescriptor, _: &TileMetadata) {
        self.url.clone_from(&model.url);
    }

    fn set_watermark(&mut self, _: &str, _: bool) {}

    fn set_render_order(&mut self, _: i32) {}

    fn active_points(&self) -> &[f32] {
        &self.points
    }

    fn dispose(self: Box<Self>) {
        log::debug!("disposed content for {}", self.url);
    }
}

/// Builds content synchronously; the completion is delivered next frame.
#[derive(Default)]
struct GridLoader {
    created: usize,
}

impl HeavyContentLoader for GridLoader {
    fn create(&mut self, request: LoadRequest, completion: LoadCompletion) {
        self.created += 1;
        log::info!(
            "{}: loading {} (ceiling {})",
            request.tile,
            request.url,
            request.max_render_count
        );
        let origin = request.matrix.transform_point3(Vec3::ZERO);
        completion.resolve(Box::new(GridContent::new(origin)));
    }
}

fn tile_document(name: &str, at: Vec3) -> String {
    serde_json::json!({
        "name": name,
        "url": format!("{name}.spx"),
        "transform": [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            at.x, at.y, at.z, 1.0,
        ],
        "watermark": "demo",
    })
    .to_string()
}

/// Drive frames for `span` of simulated time.
fn run(viewer: &mut DemoViewer, now: &mut Instant, span: Duration) {
    let end = *now + span;
    while *now < end {
        if viewer.begin_frame(*now) {
            viewer.end_frame(*now);
        }
        *now += STEP;
    }
}

fn load_options() -> Options {
    let Some(path) = std::env::args().nth(1) else {
        return Options::default();
    };
    match Options::load(Path::new(&path)) {
        Ok(options) => {
            log::info!("loaded options from {path}");
            options
        }
        Err(e) => {
            log::error!("{path}: {e}; using defaults");
            Options::default()
        }
    }
}

fn main() {
    env_logger::init();

    let tiles = [
        ("harbor", Vec3::new(0.0, 2.0, 0.0)),
        ("bridge", Vec3::new(30.0, 2.0, -20.0)),
        ("tower", Vec3::new(-60.0, 5.0, -80.0)),
    ];
    let mut source = StaticMetadataSource::new();
    for (name, at) in tiles {
        source.insert(&format!("{name}.json"), &tile_document(name, at));
    }

    let scene = StaticScene::new(
        CanvasRect::sized(1280.0, 720.0),
        Camera::looking_at(Vec3::new(0.0, 80.0, 120.0), Vec3::ZERO),
    );
    let mut viewer = MapViewer::builder(scene, GridLoader::default(), source)
        .with_options(load_options())
        .with_tile("harbor.json")
        .with_tile("bridge.json")
        .with_tile("tower.json")
        .build();

    let mut now = Instant::now();
    run(&mut viewer, &mut now, Duration::from_millis(200));
    let Some(harbor) = viewer.tile_id("harbor.json") else {
        log::error!("harbor tile missing");
        return;
    };
    if viewer.click_marker(harbor, now) {
        log::info!("clicked {harbor}, flying");
    }
    run(&mut viewer, &mut now, Duration::from_secs(4));
    log::info!("landed at {:?}", viewer.scene().camera().eye);

    let hits = viewer.pick(640.0, 360.0);
    match hits.first() {
        Some(hit) => {
            log::info!("pick: {} hits, nearest {hit:?}", hits.len());
        }
        None => log::info!("pick: nothing under the canvas center"),
    }

    run(&mut viewer, &mut now, Duration::from_millis(100));
    viewer.set_waypoints(vec![CameraPose::new(
        Vec3::new(0.0, 150.0, 200.0),
        Vec3::ZERO,
    )]);
    if viewer.fly_through(now) {
        log::info!("flying away");
    }
    run(&mut viewer, &mut now, Duration::from_secs(70));

    for tile in viewer.tiles() {
        log::info!(
            "{}: active {}, content {}, marker visible {}",
            tile.id(),
            tile.is_active(),
            tile.content().is_some(),
            tile.marker().is_some_and(|m| m.visible)
        );
    }
    log::info!(
        "{} content loads, {:.1} updates/s",
        viewer.loader().created,
        viewer.fps()
    );
    viewer.dispose();
}
