//! Per-tile metadata document.

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::scene::GeoCoord;

/// Immutable description of one tile, fetched once at registration.
///
/// Unknown fields are ignored. A missing or unreadable document behaves
/// like `{}`: identity placement, no content URL, watermark enabled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawTileMetadata")]
pub struct TileMetadata {
    /// Display name, used as watermark fallback and marker title.
    pub name: Option<String>,
    /// URL of the heavy content.
    pub url: Option<String>,
    /// Explicit column-major 4x4 world transform.
    pub transform: Option<Vec<f32>>,
    /// `[lon, lat, height]` placement (`WGS84`), used when no transform
    /// is given.
    pub wgs84: Option<Vec<f64>>,
    /// Partition factor of the content (`autoCut`).
    pub auto_cut: Option<f64>,
    /// Whether the content shows its watermark text (`showWatermark` or
    /// `showWaterMark`).
    pub show_watermark: bool,
    /// Explicit watermark text.
    pub watermark: Option<String>,
}

/// Wire form. Both watermark-flag spellings occur in the wild and may
/// appear together; `showWatermark` wins when they do.
#[derive(Deserialize)]
struct RawTileMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    transform: Option<Vec<f32>>,
    #[serde(default, rename = "WGS84")]
    wgs84: Option<Vec<f64>>,
    #[serde(default, rename = "autoCut")]
    auto_cut: Option<f64>,
    #[serde(default, rename = "showWatermark")]
    show_watermark: Option<bool>,
    #[serde(default, rename = "showWaterMark")]
    show_water_mark: Option<bool>,
    #[serde(default)]
    watermark: Option<String>,
}

impl From<RawTileMetadata> for TileMetadata {
    fn from(raw: RawTileMetadata) -> Self {
        Self {
            name: raw.name,
            url: raw.url,
            transform: raw.transform,
            wgs84: raw.wgs84,
            auto_cut: raw.auto_cut,
            show_watermark: raw
                .show_watermark
                .or(raw.show_water_mark)
                .unwrap_or(true),
            watermark: raw.watermark,
        }
    }
}

impl Default for TileMetadata {
    fn default() -> Self {
        Self {
            name: None,
            url: None,
            transform: None,
            wgs84: None,
            auto_cut: None,
            show_watermark: true,
            watermark: None,
        }
    }
}

impl TileMetadata {
    /// Parse a fetched body. `None` (failed fetch) and malformed JSON both
    /// yield the empty document; the latter is logged.
    #[must_use]
    pub fn from_json_or_empty(url: &str, body: Option<&str>) -> Self {
        let Some(text) = body else {
            return Self::default();
        };
        match serde_json::from_str(text) {
            Ok(meta) => meta,
            Err(e) => {
                log::error!("tile metadata {url}: {e}");
                Self::default()
            }
        }
    }

    /// World transform of the tile.
    ///
    /// An explicit 16-element `transform` wins; otherwise `WGS84` is
    /// converted through `geo_to_world` into a translation; otherwise the
    /// identity.
    pub fn world_matrix(
        &self,
        geo_to_world: impl FnOnce(GeoCoord) -> Vec3,
    ) -> Mat4 {
        if let Some(cols) = self.transform.as_deref() {
            if cols.len() == 16 {
                return Mat4::from_cols_slice(cols);
            }
            log::warn!(
                "ignoring transform with {} elements (expected 16)",
                cols.len()
            );
        }
        if let Some(geo) = self.geo() {
            return Mat4::from_translation(geo_to_world(geo));
        }
        Mat4::IDENTITY
    }

    fn geo(&self) -> Option<GeoCoord> {
        match self.wgs84.as_deref()? {
            [lon, lat] => Some(GeoCoord::new(*lon, *lat, 0.0)),
            [lon, lat, height, ..] => Some(GeoCoord::new(*lon, *lat, *height)),
            _ => None,
        }
    }

    /// Partition factor greater than one: the content uses the smaller
    /// partitioned render ceilings.
    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        self.auto_cut.is_some_and(|cut| cut > 1.0)
    }

    /// Partition factor present and non-zero: the loader is asked to run
    /// in partitioned mode.
    #[must_use]
    pub fn partition_requested(&self) -> bool {
        self.auto_cut.is_some_and(|cut| cut != 0.0 && !cut.is_nan())
    }

    /// Watermark text: explicit `watermark`, else `name`, else empty.
    #[must_use]
    pub fn watermark_text(&self) -> &str {
        [&self.watermark, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    /// Name for logs and marker titles.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_defaults() {
        let meta = TileMetadata::from_json_or_empty("a", Some("{}"));
        assert_eq!(meta, TileMetadata::default());
        assert!(meta.show_watermark);
        assert_eq!(meta.world_matrix(|_| Vec3::ONE), Mat4::IDENTITY);
        assert!(meta.url.is_none());
    }

    #[test]
    fn failed_fetch_and_malformed_json_are_empty() {
        assert_eq!(
            TileMetadata::from_json_or_empty("a", None),
            TileMetadata::default()
        );
        assert_eq!(
            TileMetadata::from_json_or_empty("a", Some("{not json")),
            TileMetadata::default()
        );
        assert_eq!(
            TileMetadata::from_json_or_empty("a", Some("42")),
            TileMetadata::default()
        );
    }

    #[test]
    fn transform_wins_over_geo() {
        let meta = TileMetadata::from_json_or_empty(
            "a",
            Some(
                r#"{
                    "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, 7,8,9,1],
                    "WGS84": [120.0, 30.0, 0.0]
                }"#,
            ),
        );
        let m = meta.world_matrix(|_| Vec3::splat(100.0));
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn geo_placement_uses_conversion() {
        let meta = TileMetadata::from_json_or_empty(
            "a",
            Some(r#"{ "WGS84": [120.0, 30.0, 12.0] }"#),
        );
        let m = meta.world_matrix(|g| {
            assert_eq!(g, GeoCoord::new(120.0, 30.0, 12.0));
            Vec3::new(1.0, 2.0, 3.0)
        });
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn short_transform_falls_back() {
        let meta = TileMetadata::from_json_or_empty(
            "a",
            Some(r#"{ "transform": [1, 2, 3] }"#),
        );
        assert_eq!(meta.world_matrix(|_| Vec3::ONE), Mat4::IDENTITY);
    }

    #[test]
    fn watermark_flag_aliases() {
        let a = TileMetadata::from_json_or_empty(
            "a",
            Some(r#"{ "showWaterMark": false }"#),
        );
        let b = TileMetadata::from_json_or_empty(
            "b",
            Some(r#"{ "showWatermark": false }"#),
        );
        assert!(!a.show_watermark);
        assert!(!b.show_watermark);
    }

    #[test]
    fn both_watermark_spellings_keep_the_document() {
        let meta = TileMetadata::from_json_or_empty(
            "a",
            Some(
                r#"{
                    "url": "x.spx",
                    "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, 4,5,6,1],
                    "showWatermark": false,
                    "showWaterMark": true
                }"#,
            ),
        );
        assert_eq!(meta.url.as_deref(), Some("x.spx"));
        assert!(!meta.show_watermark);
        let m = meta.world_matrix(|_| Vec3::ONE);
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn watermark_text_fallbacks() {
        let mut meta = TileMetadata {
            name: Some("Harbor".into()),
            ..TileMetadata::default()
        };
        assert_eq!(meta.watermark_text(), "Harbor");
        meta.watermark = Some(String::new());
        assert_eq!(meta.watermark_text(), "Harbor");
        meta.watermark = Some("(c) City".into());
        assert_eq!(meta.watermark_text(), "(c) City");
        assert_eq!(TileMetadata::default().watermark_text(), "");
    }

    #[test]
    fn partition_flags() {
        let with = |cut| TileMetadata {
            auto_cut: cut,
            ..TileMetadata::default()
        };
        assert!(!with(None).partition_requested());
        assert!(!with(Some(0.0)).partition_requested());
        assert!(with(Some(1.0)).partition_requested());
        assert!(!with(Some(1.0)).is_partitioned());
        assert!(with(Some(4.0)).is_partitioned());
    }
}
