use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::Vec3;
use web_time::{Duration, Instant};

use super::*;
use crate::camera::Camera;
use crate::scene::{CanvasRect, SceneQuery, StaticScene};
use crate::test_support::{tile_json, CountingContent, RecordingLoader};
use crate::tile::{ContentSlot, StaticMetadataSource};

type TestViewer = MapViewer<StaticScene, RecordingLoader, StaticMetadataSource>;

const FRAME: Duration = Duration::from_millis(30);

fn source(tiles: &[(&str, Vec3)]) -> StaticMetadataSource {
    let mut source = StaticMetadataSource::new();
    for (name, at) in tiles {
        let url = format!("{name}.json");
        source.insert(&url, &tile_json(name, at.x, at.y, at.z));
    }
    source
}

fn viewer(tiles: &[(&str, Vec3)], eye: Vec3, options: Options) -> TestViewer {
    let scene = StaticScene::new(
        CanvasRect::sized(800.0, 600.0),
        Camera::looking_at(eye, Vec3::ZERO),
    );
    let mut builder =
        MapViewer::builder(scene, RecordingLoader::default(), source(tiles))
            .with_options(options);
    for (name, _) in tiles {
        builder = builder.with_tile(format!("{name}.json"));
    }
    builder.build()
}

/// One tile `a` at the origin, camera on the +Z axis.
fn single(eye_z: f32) -> TestViewer {
    viewer(
        &[("a", Vec3::ZERO)],
        Vec3::new(0.0, 0.0, eye_z),
        Options::default(),
    )
}

fn frame(viewer: &mut TestViewer, now: Instant) -> bool {
    let ran = viewer.begin_frame(now);
    viewer.end_frame(now);
    ran
}

/// Resolve every outstanding load with counting content.
fn resolve_all(viewer: &mut TestViewer) -> Vec<Arc<AtomicUsize>> {
    resolve_all_with(viewer, &[])
}

fn resolve_all_with(
    viewer: &mut TestViewer,
    points: &[f32],
) -> Vec<Arc<AtomicUsize>> {
    let pending = std::mem::take(&mut viewer.loader_mut().pending);
    pending
        .into_iter()
        .map(|(_, completion)| {
            let (content, disposed) =
                CountingContent::with_points(points.to_vec());
            completion.resolve(Box::new(content));
            disposed
        })
        .collect()
}

fn assert_near(a: Vec3, b: Vec3) {
    assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
}

// ── Registration ──

#[test]
fn registering_twice_returns_same_id() {
    let mut v = single(100.0);
    let first = v.tile_id("a.json");
    assert_eq!(v.register_tile("a.json"), first);
    assert_eq!(v.tile_count(), 1);
}

#[test]
fn tile_without_metadata_has_no_marker_until_fetched() {
    let mut v = single(100.0);
    let id = v.tile_id("a.json").unwrap();
    assert!(v.tile(id).unwrap().marker().is_none());

    assert!(frame(&mut v, Instant::now()));
    assert!(v.tile(id).unwrap().marker().is_some());
}

#[test]
fn missing_metadata_places_tile_at_origin() {
    let scene =
        StaticScene::new(CanvasRect::sized(800.0, 600.0), Camera::default());
    let mut v = MapViewer::builder(
        scene,
        RecordingLoader::default(),
        StaticMetadataSource::new(),
    )
    .build();
    let id = v.register_tile("missing.json").unwrap();
    assert!(frame(&mut v, Instant::now()));

    let tile = v.tile(id).unwrap();
    assert!(tile.metadata().is_some());
    assert_eq!(tile.position(), Vec3::ZERO);
}

// ── Activation ──

#[test]
fn far_tile_shows_scaled_marker() {
    let mut v = single(45.0);
    let id = v.tile_id("a.json").unwrap();
    assert!(frame(&mut v, Instant::now()));

    let marker = v.tile(id).unwrap().marker().unwrap();
    assert!(marker.visible);
    assert!((marker.scale - 0.09).abs() < 1e-4);
    assert_eq!(v.loader().total_requests, 0);
}

#[test]
fn near_tile_loads_then_shows_content() {
    let mut v = single(10.0);
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));

    let (request, _) = &v.loader().pending[0];
    assert_eq!(request.tile, id);
    assert_eq!(request.url, "a.spx");
    assert!(!request.depth_test);
    assert!(!request.partitioned);
    assert_eq!(request.max_render_count, 4_000_000);
    assert!(matches!(v.tile(id).unwrap().slot(), ContentSlot::Loading { .. }));
    // The marker stays up until the content arrives.
    assert!(v.tile(id).unwrap().marker().unwrap().visible);

    let disposed = resolve_all(&mut v);
    assert!(frame(&mut v, t0 + FRAME));

    let content = v.tile(id).unwrap().content().unwrap();
    assert!(content.is_visible());
    assert!(!v.tile(id).unwrap().marker().unwrap().visible);
    assert_eq!(disposed[0].load(Ordering::SeqCst), 0);
    assert_eq!(v.loader().total_requests, 1);
}

#[test]
fn only_closest_tiles_are_active() {
    let mut options = Options::default();
    options.activation.max_active_desktop = 1;
    let mut v = viewer(
        &[("far", Vec3::new(0.0, 0.0, -5.0)), ("close", Vec3::ZERO)],
        Vec3::new(0.0, 0.0, 10.0),
        options,
    );
    let close = v.tile_id("close.json").unwrap();
    let far = v.tile_id("far.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));

    assert!(v.tile(close).unwrap().is_active());
    assert!(!v.tile(far).unwrap().is_active());
    assert_eq!(v.loader().total_requests, 1);
    assert_eq!(v.loader().pending[0].0.tile, close);
    // The inactive tile keeps its marker even though it is near.
    assert!(v.tile(far).unwrap().marker().unwrap().visible);
}

#[test]
fn every_near_tile_becomes_resident() {
    let mut v = viewer(
        &[("b", Vec3::new(0.0, 0.0, -5.0)), ("a", Vec3::ZERO)],
        Vec3::new(0.0, 0.0, 10.0),
        Options::default(),
    );
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let _ = resolve_all(&mut v);
    assert!(frame(&mut v, t0 + FRAME));

    let a = v.tile_id("a.json").unwrap();
    let b = v.tile_id("b.json").unwrap();
    assert!(v.tile(a).unwrap().content().is_some());
    assert!(v.tile(b).unwrap().content().is_some());
    assert_eq!(v.nearest_visible_content(), Some(a));
}

// ── Frame loop ──

#[test]
fn throttled_frames_still_deliver_completions() {
    let mut v = single(10.0);
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let _ = resolve_all(&mut v);

    assert!(!v.begin_frame(t0 + Duration::from_millis(10)));
    assert!(matches!(v.tile(id).unwrap().slot(), ContentSlot::Resident(_)));
    assert!(v.begin_frame(t0 + FRAME));
}

#[test]
fn inactive_content_is_released_after_debounce() {
    let mut v = single(10.0);
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let disposed = resolve_all(&mut v);
    let t1 = t0 + FRAME;
    assert!(frame(&mut v, t1));

    v.scene_mut().camera.eye = Vec3::new(0.0, 0.0, 100.0);
    let t2 = t1 + Duration::from_secs(61);

    // end_frame without a successful begin_frame does nothing.
    v.end_frame(t2);
    assert!(!v.tile(id).unwrap().release_pending());

    assert!(frame(&mut v, t2));
    assert!(v.tile(id).unwrap().release_pending());
    assert!(!v.tile(id).unwrap().content().unwrap().is_visible());

    assert!(frame(&mut v, t2 + FRAME));
    assert!(matches!(v.tile(id).unwrap().slot(), ContentSlot::Empty));
    assert_eq!(disposed[0].load(Ordering::SeqCst), 1);
}

#[test]
fn returning_before_the_deadline_keeps_content() {
    let mut options = Options::default();
    options.residency.release_delay_ms = 1000;
    let mut v =
        viewer(&[("a", Vec3::ZERO)], Vec3::new(0.0, 0.0, 10.0), options);
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let disposed = resolve_all(&mut v);
    let t1 = t0 + FRAME;
    assert!(frame(&mut v, t1));

    v.scene_mut().camera.eye = Vec3::new(0.0, 0.0, 100.0);
    let t2 = t1 + Duration::from_secs(61);
    assert!(frame(&mut v, t2));
    assert!(v.tile(id).unwrap().release_pending());

    v.scene_mut().camera.eye = Vec3::new(0.0, 0.0, 10.0);
    assert!(frame(&mut v, t2 + FRAME));
    assert!(!v.tile(id).unwrap().release_pending());

    assert!(frame(&mut v, t2 + Duration::from_secs(2)));
    assert!(v.tile(id).unwrap().content().unwrap().is_visible());
    assert_eq!(disposed[0].load(Ordering::SeqCst), 0);
}

// ── Flights ──

#[test]
fn marker_click_flies_to_standoff() {
    let tile = Vec3::new(0.0, 5.0, 0.0);
    let eye = Vec3::new(0.0, 5.0, 100.0);
    let mut v = viewer(&[("a", tile)], eye, Options::default());
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));

    assert!(v.click_marker(id, t0));
    assert!(!v.click_marker(id, t0 + FRAME));
    assert!(v.flight().is_flying());

    assert!(frame(&mut v, t0 + Duration::from_secs(3)));
    assert!(!v.flight().is_flying());
    let camera = v.scene().camera();
    assert_near(camera.eye, Vec3::new(0.0, 5.0, 2.0));
    assert_near(camera.target, tile);
    // Landing inside the near cutoff requests the content.
    assert_eq!(v.loader().total_requests, 1);
}

#[test]
fn clicking_unknown_tile_does_nothing() {
    let mut v = viewer(&[], Vec3::new(0.0, 5.0, 100.0), Options::default());
    assert!(!v.click_marker(TileId(7), Instant::now()));
    assert!(!v.flight().is_flying());
}

#[test]
fn fly_through_visits_waypoints_in_order() {
    let mut v = viewer(&[], Vec3::new(0.0, 5.0, 100.0), Options::default());
    let p1 = CameraPose::new(Vec3::new(10.0, 5.0, 0.0), Vec3::ZERO);
    let p2 = CameraPose::new(Vec3::new(0.0, 8.0, 20.0), Vec3::ZERO);
    v.set_waypoints(vec![p1, p2]);

    let t0 = Instant::now();
    assert!(v.fly_through(t0));
    assert!(v.is_flying_through());
    assert!(!v.fly_through(t0));

    assert!(frame(&mut v, t0 + Duration::from_secs(3)));
    assert_near(v.scene().camera().eye, p1.position);
    assert!(v.flight().is_flying());

    assert!(frame(&mut v, t0 + Duration::from_secs(6)));
    assert_near(v.scene().camera().eye, p2.position);
    assert!(!v.flight().is_flying());
    assert!(!v.is_flying_through());
}

#[test]
fn waypoints_are_capped() {
    let mut v = viewer(&[], Vec3::new(0.0, 5.0, 100.0), Options::default());
    v.set_waypoints(vec![CameraPose::new(Vec3::Y, Vec3::ZERO); 150]);
    assert_eq!(v.waypoints().len(), MAX_WAYPOINTS);
    assert!(!v.add_waypoint());

    v.clear_waypoints();
    assert!(v.add_waypoint());
    assert_eq!(v.waypoints()[0].position, Vec3::new(0.0, 5.0, 100.0));
}

// ── Scene index ──

#[test]
fn scene_index_places_camera_and_registers_tiles_once() {
    let index = r#"{
        "lookAt": { "world": { "x": 1, "y": 2, "z": 3 } },
        "position": { "world": { "x": 0, "y": 50, "z": 80 } },
        "scenes": ["a.json", "b.json", "a.json"]
    }"#;
    let mut source = source(&[("a", Vec3::ZERO), ("b", Vec3::X)]);
    source.insert("index.json", index);
    let scene =
        StaticScene::new(CanvasRect::sized(800.0, 600.0), Camera::default());
    let mut v = MapViewer::builder(scene, RecordingLoader::default(), source)
        .with_scene_index("index.json")
        .build();

    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    assert_eq!(v.tile_count(), 2);
    let camera = v.scene().camera();
    assert_eq!(camera.target, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(camera.eye, Vec3::new(0.0, 50.0, 80.0));

    // Tile documents fetched during the index pump arrive next frame.
    assert!(frame(&mut v, t0 + FRAME));
    assert!(v.tiles().iter().all(|t| t.metadata().is_some()));
}

#[test]
fn broken_scene_index_is_ignored() {
    let source = StaticMetadataSource::new().with("index.json", "not json");
    let scene =
        StaticScene::new(CanvasRect::sized(800.0, 600.0), Camera::default());
    let before = scene.camera.clone();
    let mut v = MapViewer::builder(scene, RecordingLoader::default(), source)
        .with_scene_index("index.json")
        .build();

    assert!(frame(&mut v, Instant::now()));
    assert_eq!(v.tile_count(), 0);
    assert_eq!(v.scene().camera(), &before);
}

// ── Teardown ──

#[test]
fn removed_tile_disposes_late_content() {
    let mut v = single(10.0);
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));

    assert!(v.remove_tile(id));
    assert!(!v.remove_tile(id));
    assert_eq!(v.tile_id("a.json"), None);

    let disposed = resolve_all(&mut v);
    assert!(frame(&mut v, t0 + FRAME));
    assert_eq!(disposed[0].load(Ordering::SeqCst), 1);
}

#[test]
fn dispose_is_idempotent() {
    let mut v = single(10.0);
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let disposed = resolve_all(&mut v);
    assert!(frame(&mut v, t0 + FRAME));

    v.dispose();
    v.dispose();
    assert!(v.is_disposed());
    assert_eq!(v.tile_count(), 0);
    assert_eq!(disposed[0].load(Ordering::SeqCst), 1);
    assert!(!v.begin_frame(t0 + FRAME * 2));
    assert_eq!(v.register_tile("a.json"), None);

    drop(v);
    assert_eq!(disposed[0].load(Ordering::SeqCst), 1);
}

#[test]
fn dispose_stops_flight() {
    let eye = Vec3::new(0.0, 1.0, 100.0);
    let mut v = viewer(&[("a", Vec3::Y)], eye, Options::default());
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    assert!(v.click_marker(id, t0));

    v.dispose();
    assert!(!v.flight().is_flying());
}

// ── Queries ──

#[test]
fn pick_includes_resident_content_and_scene_splats() {
    let mut v = single(10.0);
    v.scene_mut().splats.push(vec![0.0, 0.0, -5.0]);
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let _ = resolve_all_with(&mut v, &[0.0, 0.0, 0.0]);
    assert!(frame(&mut v, t0 + FRAME));

    let hits = v.pick(400.0, 300.0);
    assert_eq!(hits.len(), 2);
    assert_near(hits[0], Vec3::ZERO);
    assert_near(hits[1], Vec3::new(0.0, 0.0, -5.0));
}

#[test]
fn hidden_content_is_not_pickable() {
    let mut v = single(10.0);
    let id = v.tile_id("a.json").unwrap();
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    let _ = resolve_all_with(&mut v, &[0.0, 0.0, 0.0]);
    assert!(frame(&mut v, t0 + FRAME));
    assert_eq!(v.pick(400.0, 300.0).len(), 1);

    // Past the cutoff the content stays resident but hidden.
    v.scene_mut().camera.eye = Vec3::new(0.0, 0.0, 45.0);
    assert!(frame(&mut v, t0 + FRAME * 2));
    let tile = v.tile(id).unwrap();
    assert!(!tile.content().unwrap().is_visible());
    assert!(tile.marker().unwrap().visible);
    assert!(v.pick(400.0, 300.0).is_empty());
}

#[test]
fn ray_distance_through_canvas_center() {
    let v = viewer(&[], Vec3::new(0.0, 0.0, 10.0), Options::default());
    let d = v.ray_distance_to_point(400.0, 300.0, Vec3::new(3.0, 0.0, 0.0));
    assert!((d - 3.0).abs() < 1e-3);
}

#[test]
fn tiles_in_view_skip_tiles_behind_camera() {
    let mut v = viewer(
        &[("front", Vec3::ZERO), ("behind", Vec3::new(0.0, 0.0, 30.0))],
        Vec3::new(0.0, 0.0, 10.0),
        Options::default(),
    );
    assert!(frame(&mut v, Instant::now()));
    assert_eq!(v.tiles_in_view(), vec![v.tile_id("front.json").unwrap()]);
}

#[test]
fn nearest_visible_content_ignores_hidden_content() {
    let mut v = single(10.0);
    let t0 = Instant::now();
    assert!(frame(&mut v, t0));
    assert_eq!(v.nearest_visible_content(), None);

    let _ = resolve_all(&mut v);
    assert!(frame(&mut v, t0 + FRAME));
    assert!(v.nearest_visible_content().is_some());

    v.scene_mut().camera.eye = Vec3::new(0.0, 0.0, 100.0);
    assert!(frame(&mut v, t0 + FRAME * 2));
    assert_eq!(v.nearest_visible_content(), None);
}
