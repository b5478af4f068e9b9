//! Shared test doubles: counting content, a recording loader and tile
//! documents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::tile::{
    HeavyContent, HeavyContentLoader, LoadCompletion, LoadRequest,
    ModelDescriptor, TileMetadata,
};

/// Content that counts how often it is disposed.
#[derive(Debug)]
pub(crate) struct CountingContent {
    pub visible: bool,
    pub model_url: Option<String>,
    pub watermark: Option<(String, bool)>,
    pub render_order: i32,
    pub points: Vec<f32>,
    disposed: Arc<AtomicUsize>,
}

impl CountingContent {
    /// New content plus a handle to its dispose counter.
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        Self::with_points(Vec::new())
    }

    /// Content drawing the given flat point array.
    pub fn with_points(points: Vec<f32>) -> (Self, Arc<AtomicUsize>) {
        let disposed = Arc::new(AtomicUsize::new(0));
        let content = Self {
            visible: false,
            model_url: None,
            watermark: None,
            render_order: 0,
            points,
            disposed: Arc::clone(&disposed),
        };
        (content, disposed)
    }
}

impl HeavyContent for CountingContent {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn add_model(&mut self, model: &ModelDescriptor, _: &TileMetadata) {
        self.model_url = Some(model.url.clone());
    }

    fn set_watermark(&mut self, text: &str, show: bool) {
        self.watermark = Some((text.to_owned(), show));
    }

    fn set_render_order(&mut self, order: i32) {
        self.render_order = order;
    }

    fn active_points(&self) -> &[f32] {
        &self.points
    }

    fn dispose(self: Box<Self>) {
        let _ = self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Loader that keeps every request so tests decide when it resolves.
#[derive(Debug, Default)]
pub(crate) struct RecordingLoader {
    pub pending: Vec<(LoadRequest, LoadCompletion)>,
    pub total_requests: usize,
}

impl HeavyContentLoader for RecordingLoader {
    fn create(&mut self, request: LoadRequest, completion: LoadCompletion) {
        self.total_requests += 1;
        self.pending.push((request, completion));
    }
}

/// Metadata document placing a tile at `(x, y, z)` via an explicit
/// transform.
pub(crate) fn tile_json(name: &str, x: f32, y: f32, z: f32) -> String {
    format!(
        r#"{{
            "name": "{name}",
            "url": "{name}.spx",
            "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, {x},{y},{z},1]
        }}"#
    )
}
