//! Shared utilities: easing curves and frame throttling.

pub mod easing;
pub mod frame_timing;
