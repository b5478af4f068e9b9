//! Pickable geometry: triangle surfaces and flat splat point arrays.

use glam::{Mat4, Vec3};

use super::ray::Ray;

/// Per-object flags that take a surface out of the surface pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickFlags {
    /// The object never participates in ray hit-testing.
    pub ignore_intersect: bool,
    /// The object is a tile marker.
    pub is_mark: bool,
}

impl PickFlags {
    /// Whether the surface pass should skip this object.
    #[must_use]
    pub const fn excluded(self) -> bool {
        self.ignore_intersect || self.is_mark
    }
}

/// Ordinary scene geometry that can be hit-tested with a ray.
pub trait Surface {
    /// Flags controlling whether this surface is considered at all.
    fn pick_flags(&self) -> PickFlags;

    /// Append every world-space point where `ray` hits this surface.
    fn intersect(&self, ray: &Ray, hits: &mut Vec<Vec3>);
}

/// Source of splat centers for the splat pass.
pub trait SplatPoints {
    /// Flat `[x0, y0, z0, x1, y1, z1, ...]` array of the currently active
    /// points in world space. A trailing partial triple is ignored.
    fn active_points(&self) -> &[f32];
}

/// Indexed triangle geometry with a model-to-world transform.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions in model space.
    pub positions: Vec<Vec3>,
    /// Triangle vertex indices into `positions`.
    pub indices: Vec<[u32; 3]>,
    /// Model-to-world transform.
    pub world: Mat4,
    /// Picking flags.
    pub flags: PickFlags,
}

impl TriangleMesh {
    /// Mesh in world space with default flags.
    #[must_use]
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            indices,
            world: Mat4::IDENTITY,
            flags: PickFlags::default(),
        }
    }

    /// Replace the model-to-world transform.
    #[must_use]
    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    /// Replace the picking flags.
    #[must_use]
    pub fn with_flags(mut self, flags: PickFlags) -> Self {
        self.flags = flags;
        self
    }

    fn vertex(&self, index: u32) -> Option<Vec3> {
        let local = self.positions.get(index as usize)?;
        Some(self.world.transform_point3(*local))
    }
}

impl Surface for TriangleMesh {
    fn pick_flags(&self) -> PickFlags {
        self.flags
    }

    fn intersect(&self, ray: &Ray, hits: &mut Vec<Vec3>) {
        for &[i0, i1, i2] in &self.indices {
            let (Some(a), Some(b), Some(c)) =
                (self.vertex(i0), self.vertex(i1), self.vertex(i2))
            else {
                continue;
            };
            if let Some(t) = ray.intersect_triangle(a, b, c) {
                hits.push(ray.at(t));
            }
        }
    }
}

impl SplatPoints for Vec<f32> {
    fn active_points(&self) -> &[f32] {
        self
    }
}

/// Append every point of `points` within `radius` of the ray, paired with
/// its distance from the ray origin.
pub fn splat_hits(
    ray: &Ray,
    points: &[f32],
    radius: f32,
    out: &mut Vec<(Vec3, f32)>,
) {
    for xyz in points.chunks_exact(3) {
        let p = Vec3::new(xyz[0], xyz[1], xyz[2]);
        if ray.distance_to_point(p) <= radius {
            out.push((p, p.distance(ray.origin)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_at_z(z: f32) -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(-1.0, 1.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn mesh_hit_uses_world_transform() {
        let ray = Ray::new(Vec3::new(0.25, -0.5, 0.0), Vec3::NEG_Z);
        let mesh = quad_at_z(0.0)
            .with_world(Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0)));
        let mut hits = Vec::new();
        mesh.intersect(&ray, &mut hits);
        assert!(!hits.is_empty());
        assert!(hits[0].abs_diff_eq(Vec3::new(0.25, -0.5, -4.0), 1e-5));
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let ray = Ray::new(Vec3::new(0.25, -0.5, 0.0), Vec3::NEG_Z);
        let mut mesh = quad_at_z(-2.0);
        mesh.indices.push([0, 7, 9]);
        let mut hits = Vec::new();
        mesh.intersect(&ray, &mut hits);
        assert!(!hits.is_empty());
    }

    #[test]
    fn splat_radius_boundary() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let points = vec![0.03, 0.0, -5.0, 0.0301, 0.0, -6.0];
        let mut out = Vec::new();
        splat_hits(&ray, &points, 0.03, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, Vec3::new(0.03, 0.0, -5.0));
    }

    #[test]
    fn trailing_partial_point_is_ignored() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let points = vec![0.0, 0.0, -1.0, 0.0, 0.0];
        let mut out = Vec::new();
        splat_hits(&ray, &points, 0.03, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn flags_exclusion() {
        assert!(!PickFlags::default().excluded());
        assert!(PickFlags {
            is_mark: true,
            ..PickFlags::default()
        }
        .excluded());
        assert!(PickFlags {
            ignore_intersect: true,
            ..PickFlags::default()
        }
        .excluded());
    }
}
