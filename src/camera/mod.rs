//! Camera state shared by the viewer, flights and picking.
//!
//! The camera's `target` is the map controls' orbit target; flights write
//! both fields directly so the renderer picks them up on the next frame.

/// Core camera struct, poses, ray construction and view tests.
pub mod core;

pub use self::core::{Camera, CameraPose};
