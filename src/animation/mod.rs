//! Time-driven camera animation.
//!
//! Flights are advanced once per frame by the viewer with an explicit
//! timestamp, so they are deterministic under test.

pub mod flight;

pub use flight::{FlightAnimator, FlightState};
