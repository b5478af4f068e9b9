//! Heavy splat content and the asynchronous loader that creates it.
//!
//! The loader answers a [`LoadRequest`] by resolving its [`LoadCompletion`]
//! from any thread at any later time. Completions queue on a
//! [`LoadChannel`] that the viewer drains on the render thread, so a
//! late answer never touches tile state directly. Content that cannot be
//! delivered (viewer gone, tile disposed, request superseded) is disposed
//! on the spot.

use std::sync::mpsc;

use glam::Mat4;

use super::metadata::TileMetadata;
use super::TileId;
use crate::picking::SplatPoints;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Model reference handed to [`HeavyContent::add_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Content URL from the tile metadata (empty when absent).
    pub url: String,
}

/// A resident renderable splat model owned by exactly one tile.
pub trait HeavyContent: Send {
    /// Show or hide the content.
    fn set_visible(&mut self, visible: bool);

    /// Whether the content is currently shown.
    fn is_visible(&self) -> bool;

    /// Start streaming the model data.
    fn add_model(&mut self, model: &ModelDescriptor, metadata: &TileMetadata);

    /// Configure the watermark overlay.
    fn set_watermark(&mut self, text: &str, show: bool);

    /// Draw order among transparent objects; larger draws later.
    fn set_render_order(&mut self, order: i32);

    /// Flat world-space positions of the points currently drawn.
    fn active_points(&self) -> &[f32];

    /// Release every resource held by the content.
    fn dispose(self: Box<Self>);
}

/// Adapts resident content to the picker's point source interface.
pub struct ContentPoints<'a>(pub &'a dyn HeavyContent);

impl SplatPoints for ContentPoints<'_> {
    fn active_points(&self) -> &[f32] {
        self.0.active_points()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Everything a loader needs to build content for one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Requesting tile.
    pub tile: TileId,
    /// Content URL (empty when the metadata has none).
    pub url: String,
    /// Tile world transform.
    pub matrix: Mat4,
    /// Depth testing against the rest of the scene. Always off.
    pub depth_test: bool,
    /// Run the content in partitioned mode.
    pub partitioned: bool,
    /// Watermark text.
    pub watermark: String,
    /// Whether to show the watermark.
    pub show_watermark: bool,
    /// Maximum number of points the content may draw.
    pub max_render_count: u32,
    /// Loader diagnostics enabled.
    pub debug_mode: bool,
}

/// Creates heavy content asynchronously.
pub trait HeavyContentLoader {
    /// Begin creating content for `request`; resolve `completion` when
    /// done. Dropping the completion abandons the request.
    fn create(&mut self, request: LoadRequest, completion: LoadCompletion);
}

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

/// Content delivered for a tile, tagged with the request ticket.
///
/// Dropping an undelivered value disposes the content.
pub struct LoadedContent {
    tile: TileId,
    ticket: u64,
    content: Option<Box<dyn HeavyContent>>,
}

impl LoadedContent {
    /// Tile the content was requested for.
    #[must_use]
    pub const fn tile(&self) -> TileId {
        self.tile
    }

    /// Ticket of the request this answers.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Take ownership of the content.
    #[must_use]
    pub fn into_content(mut self) -> Option<Box<dyn HeavyContent>> {
        self.content.take()
    }
}

impl Drop for LoadedContent {
    fn drop(&mut self) {
        if let Some(content) = self.content.take() {
            log::debug!("{}: disposing undelivered content", self.tile);
            content.dispose();
        }
    }
}

impl std::fmt::Debug for LoadedContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedContent")
            .field("tile", &self.tile)
            .field("ticket", &self.ticket)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

/// One-shot handle for answering a [`LoadRequest`]. `Send`, so loaders may
/// resolve it from a worker thread.
#[derive(Debug)]
pub struct LoadCompletion {
    tile: TileId,
    ticket: u64,
    tx: mpsc::Sender<LoadedContent>,
}

impl LoadCompletion {
    /// Tile this completion answers for.
    #[must_use]
    pub const fn tile(&self) -> TileId {
        self.tile
    }

    /// Request ticket.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Deliver the created content. If the viewer is gone the content is
    /// disposed immediately.
    pub fn resolve(self, content: Box<dyn HeavyContent>) {
        let loaded = LoadedContent {
            tile: self.tile,
            ticket: self.ticket,
            content: Some(content),
        };
        if self.tx.send(loaded).is_err() {
            log::debug!("{}: viewer closed before content arrived", self.tile);
        }
    }
}

/// Queue of content completions, drained once per frame.
#[derive(Debug)]
pub struct LoadChannel {
    tx: mpsc::Sender<LoadedContent>,
    rx: mpsc::Receiver<LoadedContent>,
}

impl Default for LoadChannel {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl LoadChannel {
    /// New completion handle for `tile` and `ticket`.
    #[must_use]
    pub fn completion(&self, tile: TileId, ticket: u64) -> LoadCompletion {
        LoadCompletion {
            tile,
            ticket,
            tx: self.tx.clone(),
        }
    }

    /// Every completion received so far.
    #[must_use]
    pub fn drain(&self) -> Vec<LoadedContent> {
        self.rx.try_iter().collect()
    }
}
