//! Hybrid hit-testing across triangle surfaces and splat point clouds.

use glam::Vec3;

use super::ray::Ray;
use super::surface::{splat_hits, SplatPoints, Surface};
use crate::options::PickingOptions;
use crate::scene::SceneQuery;

/// Casts a ray through a canvas point and collects every surface and splat
/// hit along it, nearest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridPicker {
    splat_radius: f32,
}

impl Default for HybridPicker {
    fn default() -> Self {
        Self::new(&PickingOptions::default())
    }
}

impl HybridPicker {
    /// Picker using the configured splat pick radius.
    #[must_use]
    pub fn new(options: &PickingOptions) -> Self {
        Self {
            splat_radius: options.splat_radius,
        }
    }

    /// Maximum perpendicular distance at which a splat point counts as hit.
    #[must_use]
    pub const fn splat_radius(&self) -> f32 {
        self.splat_radius
    }

    /// Ray from the camera eye through the client-space point `(x, y)`.
    #[must_use]
    pub fn ray_at(scene: &dyn SceneQuery, x: f32, y: f32) -> Ray {
        let ndc = scene.canvas().to_ndc(x, y);
        scene.camera().ray_through_ndc(ndc)
    }

    /// Every hit under `(x, y)` against the scene's own surfaces and
    /// splats, ascending by distance from the camera.
    #[must_use]
    pub fn pick(&self, scene: &dyn SceneQuery, x: f32, y: f32) -> Vec<Vec3> {
        let ray = Self::ray_at(scene, x, y);
        self.pick_along(&ray, &scene.surfaces(), &scene.splats())
    }

    /// Hits along an explicit ray.
    ///
    /// Surfaces flagged `ignore_intersect` or `is_mark` are skipped. Ties
    /// keep surface hits ahead of splat hits, each in source order.
    #[must_use]
    pub fn pick_along(
        &self,
        ray: &Ray,
        surfaces: &[&dyn Surface],
        splats: &[&dyn SplatPoints],
    ) -> Vec<Vec3> {
        let mut hits: Vec<(Vec3, f32)> = Vec::new();

        let mut surface_points = Vec::new();
        for surface in surfaces {
            if surface.pick_flags().excluded() {
                continue;
            }
            surface_points.clear();
            surface.intersect(ray, &mut surface_points);
            hits.extend(
                surface_points
                    .iter()
                    .map(|&p| (p, p.distance(ray.origin))),
            );
        }

        for source in splats {
            let points = source.active_points();
            splat_hits(ray, points, self.splat_radius, &mut hits);
        }

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.into_iter().map(|(p, _)| p).collect()
    }

    /// Perpendicular distance from the ray under `(x, y)` to `point`, or the
    /// distance to the eye when `point` is behind it.
    #[must_use]
    pub fn ray_distance_to_point(
        scene: &dyn SceneQuery,
        x: f32,
        y: f32,
        point: Vec3,
    ) -> f32 {
        Self::ray_at(scene, x, y).distance_to_point(point)
    }
}
