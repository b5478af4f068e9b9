//! Capabilities the viewer needs from the host scene.
//!
//! The host owns the canvas, the live camera and the ordinary scene
//! geometry. The viewer and the picker reach them only through
//! [`SceneQuery`] (read side) and [`SceneContext`] (write and convert
//! side), so a host can plug in any scene graph.
//!
//! [`StaticScene`] is a plain in-memory implementation used by the demo
//! binary and by tests.

pub mod index;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::picking::{SplatPoints, Surface, TriangleMesh};

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Bounding rectangle of the canvas in client (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl CanvasRect {
    /// Canvas at the client origin.
    #[must_use]
    pub const fn sized(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Normalized device coordinate of a client-space point.
    ///
    /// `(left, top)` maps to `(-1, 1)`, the opposite corner to `(1, -1)`.
    /// A degenerate canvas maps everything to the center.
    #[must_use]
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            ((x - self.left) / self.width) * 2.0 - 1.0,
            ((self.top - y) / self.height) * 2.0 + 1.0,
        )
    }

    /// Width over height, or 1 for a degenerate canvas.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

// ---------------------------------------------------------------------------
// Geographic coordinates
// ---------------------------------------------------------------------------

/// WGS84 longitude / latitude in degrees plus height in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Height above the ellipsoid in meters.
    #[serde(default)]
    pub height: f64,
}

impl GeoCoord {
    /// Coordinate from longitude, latitude and height.
    #[must_use]
    pub const fn new(lon: f64, lat: f64, height: f64) -> Self {
        Self { lon, lat, height }
    }
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Read access to the live scene, as needed by picking.
pub trait SceneQuery {
    /// Current canvas bounds.
    fn canvas(&self) -> CanvasRect;

    /// The live camera.
    fn camera(&self) -> &Camera;

    /// Ordinary pickable geometry (meshes, markers, helpers).
    fn surfaces(&self) -> Vec<&dyn Surface>;

    /// Splat point sources owned by the scene itself.
    fn splats(&self) -> Vec<&dyn SplatPoints>;
}

/// Mutable scene access used by the viewer: camera writes and geographic
/// conversion.
pub trait SceneContext: SceneQuery {
    /// The live camera, for flights and index documents.
    fn camera_mut(&mut self) -> &mut Camera;

    /// Convert a geographic coordinate to a world-space position.
    fn geo_to_world(&self, geo: GeoCoord) -> Vec3;
}

// ---------------------------------------------------------------------------
// StaticScene
// ---------------------------------------------------------------------------

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// In-memory scene with a local tangent-plane geo conversion.
///
/// World +X points east, -Z points north, +Y is height; one world unit is
/// one meter measured from `geo_origin`.
#[derive(Debug, Clone)]
pub struct StaticScene {
    /// Canvas bounds.
    pub canvas: CanvasRect,
    /// Live camera.
    pub camera: Camera,
    /// Pickable meshes.
    pub meshes: Vec<TriangleMesh>,
    /// Flat point arrays owned by the scene.
    pub splats: Vec<Vec<f32>>,
    /// Geographic coordinate mapped to the world origin.
    pub geo_origin: GeoCoord,
}

impl StaticScene {
    /// Empty scene with the given canvas and camera.
    #[must_use]
    pub fn new(canvas: CanvasRect, mut camera: Camera) -> Self {
        camera.aspect = canvas.aspect();
        Self {
            canvas,
            camera,
            meshes: Vec::new(),
            splats: Vec::new(),
            geo_origin: GeoCoord::new(0.0, 0.0, 0.0),
        }
    }
}

impl SceneQuery for StaticScene {
    fn canvas(&self) -> CanvasRect {
        self.canvas
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn surfaces(&self) -> Vec<&dyn Surface> {
        self.meshes.iter().map(|m| -> &dyn Surface { m }).collect()
    }

    fn splats(&self) -> Vec<&dyn SplatPoints> {
        self.splats.iter().map(|s| -> &dyn SplatPoints { s }).collect()
    }
}

impl SceneContext for StaticScene {
    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn geo_to_world(&self, geo: GeoCoord) -> Vec3 {
        let east = (geo.lon - self.geo_origin.lon)
            * METERS_PER_DEGREE
            * self.geo_origin.lat.to_radians().cos();
        let north = (geo.lat - self.geo_origin.lat) * METERS_PER_DEGREE;
        let up = geo.height - self.geo_origin.height;
        Vec3::new(east as f32, up as f32, -north as f32)
    }
}
