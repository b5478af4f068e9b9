// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Tile activation, camera flights and hybrid picking for splat maps.
//!
//! A splat map is a set of tiles, each a large Gaussian-splat point cloud
//! positioned on the globe by a small metadata document. Only the tiles
//! near the camera can afford to keep their point clouds resident; the
//! rest are drawn as lightweight markers. This crate decides which is
//! which, frame by frame, and leaves drawing to the host.
//!
//! # Key entry points
//!
//! - [`MapViewer`] - owns the tiles and drives them once per frame
//!   between [`begin_frame`](MapViewer::begin_frame) and
//!   [`end_frame`](MapViewer::end_frame)
//! - [`tile::TileProxy`] - per-tile marker, content slot and release timer
//! - [`picking::HybridPicker`] - ray picking across meshes and splats
//! - [`options::Options`] - thresholds, budgets and timers with TOML presets
//!
//! # Host integration
//!
//! The host supplies three things: a [`scene::SceneContext`] (camera,
//! canvas, pickable geometry), a [`tile::HeavyContentLoader`] that builds
//! point-cloud content, and a [`tile::MetadataSource`] that fetches tile
//! documents. Loaders and sources answer through `Send` completion
//! handles; results are drained on the frame thread at the start of the
//! next [`begin_frame`](MapViewer::begin_frame).

pub mod animation;
pub mod camera;
pub mod error;
pub mod options;
pub mod picking;
pub mod scene;
pub mod tile;
pub mod util;
pub mod viewer;

#[cfg(test)]
mod test_support;

pub use error::SplatMapError;
pub use options::Options;
pub use viewer::{MapViewer, MapViewerBuilder};
