//! Scene index documents: an initial camera placement plus a list of tile
//! metadata URLs.
//!
//! ```json
//! {
//!   "lookAt":   { "geo": { "lon": 120.1, "lat": 30.2, "height": 10 } },
//!   "position": { "world": { "x": 0, "y": 50, "z": 80 } },
//!   "scenes":   ["https://tiles.example.com/a/meta.json"]
//! }
//! ```

use glam::Vec3;
use serde::Deserialize;

use super::GeoCoord;
use crate::error::SplatMapError;

/// World-space point as written in index documents.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorldPoint {
    /// X coordinate.
    #[serde(default)]
    pub x: f32,
    /// Y coordinate.
    #[serde(default)]
    pub y: f32,
    /// Z coordinate.
    #[serde(default)]
    pub z: f32,
}

impl From<WorldPoint> for Vec3 {
    fn from(p: WorldPoint) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// A location given either in world space or geographically. When both
/// are present `world` wins.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
pub struct Placement {
    /// World-space location.
    #[serde(default)]
    pub world: Option<WorldPoint>,
    /// Geographic location.
    #[serde(default)]
    pub geo: Option<GeoCoord>,
}

impl Placement {
    /// Resolve to a world position using `geo_to_world` for geographic
    /// placements. `None` when neither form is present.
    pub fn resolve(
        &self,
        geo_to_world: impl FnOnce(GeoCoord) -> Vec3,
    ) -> Option<Vec3> {
        match (self.world, self.geo) {
            (Some(world), _) => Some(world.into()),
            (None, Some(geo)) => Some(geo_to_world(geo)),
            (None, None) => None,
        }
    }
}

/// Parsed scene index document.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SceneIndex {
    /// Initial camera look-at target.
    #[serde(default)]
    pub look_at: Option<Placement>,
    /// Initial camera position.
    #[serde(default)]
    pub position: Option<Placement>,
    /// Tile metadata URLs, possibly with duplicates.
    #[serde(default)]
    pub scenes: Vec<String>,
}

impl SceneIndex {
    /// Parse an index document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SplatMapError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Scene URLs in document order with duplicates removed.
    #[must_use]
    pub fn unique_scenes(&self) -> Vec<&str> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.scenes
            .iter()
            .map(String::as_str)
            .filter(|url| seen.insert(*url))
            .collect()
    }
}
