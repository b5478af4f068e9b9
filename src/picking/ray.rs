use glam::Vec3;

/// A half-line in world space with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point of the ray.
    pub origin: Vec3,
    /// Unit direction (normalized on construction).
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction`. A zero direction falls back to
    /// -Z so the ray stays usable.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Z);
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Perpendicular distance from the ray to `point`.
    ///
    /// Points behind the origin measure against the origin itself.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.distance_sq_to_point(point).sqrt()
    }

    /// Squared form of [`distance_to_point`](Self::distance_to_point).
    #[inline]
    #[must_use]
    pub fn distance_sq_to_point(&self, point: Vec3) -> f32 {
        let along = (point - self.origin).dot(self.direction);
        if along < 0.0 {
            return self.origin.distance_squared(point);
        }
        self.at(along).distance_squared(point)
    }

    /// Möller–Trumbore ray/triangle test. Returns the ray parameter of the
    /// hit, front or back face, or `None` when the ray misses or the hit is
    /// behind the origin.
    #[must_use]
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1.0e-7;
        let edge1 = b - a;
        let edge2 = c - a;
        let h = self.direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(h) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}
