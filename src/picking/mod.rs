//! CPU ray picking over mixed scene content.
//!
//! A pick ray runs from the camera eye through a canvas point. Triangle
//! surfaces are intersected exactly; splat content has no surface, so its
//! points count as hit when they lie within a small perpendicular radius
//! of the ray. Both kinds of hit are merged into one list sorted by
//! distance from the eye.

mod picker;
mod ray;
mod surface;

pub use picker::HybridPicker;
pub use ray::Ray;
pub use surface::{splat_hits, PickFlags, SplatPoints, Surface, TriangleMesh};
