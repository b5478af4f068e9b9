use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::picking::Ray;

/// Camera position together with the orbit-controls look-at target.
///
/// This is the unit a flight interpolates between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space.
    pub position: Vec3,
    /// Look-at target in world space.
    pub target: Vec3,
}

impl CameraPose {
    /// Pose from an eye position and a look-at target.
    #[must_use]
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Component-wise linear interpolation of position and target.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

/// Perspective camera defined by eye position, target, and projection
/// parameters.
///
/// `target` doubles as the map controls' orbit target, so writing a pose
/// into the camera moves both the camera and its controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 100.0, 100.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy: 60.0,
            znear: 0.1,
            zfar: 100_000.0,
        }
    }
}

impl Camera {
    /// Camera at `eye` looking at `target` with default projection.
    #[must_use]
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            ..Self::default()
        }
    }

    /// Current eye position and look-at target.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.eye, self.target)
    }

    /// Overwrite eye position and look-at target.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.eye = pose.position;
        self.target = pose.target;
    }

    /// World-to-view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection matrix. `perspective_rh` uses the [0,1] depth range.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the eye through a normalized device coordinate.
    ///
    /// The direction points at the unprojected mid-depth point, so it is
    /// well defined anywhere inside the viewport.
    #[must_use]
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.build_matrix().inverse();
        let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.eye, through - self.eye)
    }

    /// Clip-space visibility test with a relative margin.
    ///
    /// `range = 1.0` is the exact viewport; larger values keep points that
    /// sit just outside the edges (used to avoid popping at borders).
    #[must_use]
    pub fn is_in_view(&self, point: Vec3, range: f32) -> bool {
        let clip = self.build_matrix() * Vec4::new(point.x, point.y, point.z, 1.0);
        let limit = range * clip.w;
        !(clip.z < -limit
            || clip.x < -limit
            || clip.x > limit
            || clip.y < -limit
            || clip.y > limit)
    }
}
