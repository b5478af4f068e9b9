//! Per-tile lifecycle: marker, content slot, debounced release.

use glam::{Mat4, Vec3};
use web_time::Instant;

use super::content::{
    HeavyContent, HeavyContentLoader, LoadChannel, LoadRequest,
    ModelDescriptor,
};
use super::gate::{ActivationGate, Proximity};
use super::metadata::TileMetadata;
use super::TileId;
use crate::camera::{Camera, CameraPose};
use crate::options::{DeviceClass, FlightOptions, Options, ResidencyOptions};

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

/// Lightweight stand-in shown while a tile's content is not.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// World position (the tile origin).
    pub position: Vec3,
    /// Uniform scale, proportional to camera distance.
    pub scale: f32,
    /// Whether the marker is shown.
    pub visible: bool,
    /// Hover title.
    pub title: String,
}

// ---------------------------------------------------------------------------
// Content slot
// ---------------------------------------------------------------------------

/// Heavy content state of one tile.
#[derive(Default)]
pub enum ContentSlot {
    /// Nothing requested.
    #[default]
    Empty,
    /// A request with this ticket is outstanding.
    Loading {
        /// Ticket of the outstanding request.
        ticket: u64,
    },
    /// Content is in memory.
    Resident(Box<dyn HeavyContent>),
}

impl std::fmt::Debug for ContentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Loading { ticket } => {
                f.debug_struct("Loading").field("ticket", ticket).finish()
            }
            Self::Resident(content) => f
                .debug_struct("Resident")
                .field("visible", &content.is_visible())
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame context
// ---------------------------------------------------------------------------

/// Per-frame inputs shared by every proxy.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Frame timestamp.
    pub now: Instant,
    /// Camera eye position.
    pub eye: Vec3,
    /// Viewer options.
    pub options: &'a Options,
    /// Activation gate built from the options.
    pub gate: &'a ActivationGate,
    /// Where content completions are delivered.
    pub loads: &'a LoadChannel,
}

impl FrameContext<'_> {
    fn device(&self) -> DeviceClass {
        self.options.device
    }
}

// ---------------------------------------------------------------------------
// TileProxy
// ---------------------------------------------------------------------------

/// One tile of the map.
///
/// Owns the marker and the heavy content handle, and decides each frame
/// whether the content should be requested, shown, hidden or released.
/// The `active` flag is owned by the viewer; the proxy only reads it.
#[derive(Debug)]
pub struct TileProxy {
    id: TileId,
    source_url: String,
    metadata: Option<TileMetadata>,
    world: Mat4,
    position: Vec3,
    active: bool,
    last_active: Option<Instant>,
    slot: ContentSlot,
    marker: Option<Marker>,
    pending_release: Option<Instant>,
    wants_content: bool,
    render_order: i32,
    next_ticket: u64,
    disposed: bool,
}

impl TileProxy {
    /// Proxy for the tile whose metadata lives at `source_url`. It has no
    /// visual representation until [`apply_metadata`](Self::apply_metadata).
    #[must_use]
    pub fn new(id: TileId, source_url: &str) -> Self {
        Self {
            id,
            source_url: source_url.to_owned(),
            metadata: None,
            world: Mat4::IDENTITY,
            position: Vec3::ZERO,
            active: false,
            last_active: None,
            slot: ContentSlot::Empty,
            marker: None,
            pending_release: None,
            wants_content: false,
            render_order: 0,
            next_ticket: 0,
            disposed: false,
        }
    }

    // ── Accessors ──

    /// Tile id.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// URL of the tile's metadata document.
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Metadata, once fetched.
    #[must_use]
    pub const fn metadata(&self) -> Option<&TileMetadata> {
        self.metadata.as_ref()
    }

    /// World transform.
    #[must_use]
    pub const fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// World position of the tile origin.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether the viewer currently allows this tile to hold content.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Last time the tile was active and near.
    #[must_use]
    pub const fn last_active(&self) -> Option<Instant> {
        self.last_active
    }

    /// The marker, once metadata has arrived.
    #[must_use]
    pub const fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// Content slot state.
    #[must_use]
    pub const fn slot(&self) -> &ContentSlot {
        &self.slot
    }

    /// Resident content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&dyn HeavyContent> {
        match &self.slot {
            ContentSlot::Resident(content) => Some(content.as_ref()),
            _ => None,
        }
    }

    /// Whether a release is scheduled.
    #[must_use]
    pub const fn release_pending(&self) -> bool {
        self.pending_release.is_some()
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Distance from `eye` to the tile origin.
    #[must_use]
    pub fn distance_to(&self, eye: Vec3) -> f32 {
        self.position.distance(eye)
    }

    // ── Viewer-driven state ──

    /// Set by the owning viewer's ranking.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Draw order for resident (and future) content.
    pub fn set_render_order(&mut self, order: i32) {
        self.render_order = order;
        if let ContentSlot::Resident(content) = &mut self.slot {
            content.set_render_order(order);
        }
    }

    /// Install fetched metadata and its resolved world transform, creating
    /// a hidden marker at the tile origin. Ignored once disposed.
    pub fn apply_metadata(&mut self, metadata: TileMetadata, world: Mat4) {
        if self.disposed {
            log::debug!("{}: metadata arrived after dispose", self.id);
            return;
        }
        self.world = world;
        self.position = world.transform_point3(Vec3::ZERO);
        self.marker = Some(Marker {
            position: self.position,
            scale: 1.0,
            visible: false,
            title: metadata.display_name().to_owned(),
        });
        log::info!(
            "{}: placed '{}' at {:?}",
            self.id,
            metadata.display_name(),
            self.position
        );
        self.metadata = Some(metadata);
    }

    // ── Frame hooks ──

    /// Before rendering: classify the tile and update marker, content and
    /// load state accordingly.
    ///
    /// A near, active tile keeps its marker visible while its content is
    /// loading and hides it once the content is resident, so a load that
    /// never resolves still leaves the marker on screen.
    pub fn pre_render(
        &mut self,
        frame: &FrameContext<'_>,
        loader: &mut dyn HeavyContentLoader,
    ) {
        if self.disposed || self.metadata.is_none() {
            return;
        }
        let distance = self.distance_to(frame.eye);
        let proximity = frame.gate.classify(distance, frame.device());

        let scale = frame.options.activation.marker_scale_factor * distance;
        if proximity == Proximity::Far || !self.active {
            self.show_marker(scale);
            self.wants_content = false;
            if let ContentSlot::Resident(content) = &mut self.slot {
                content.set_visible(false);
            }
            return;
        }

        self.wants_content = true;
        self.last_active = Some(frame.now);
        self.pending_release = None;

        if matches!(self.slot, ContentSlot::Empty) {
            self.request_content(frame, loader);
        }
        // The marker stands in until content is resident, so a stalled
        // load still leaves something on screen.
        if let ContentSlot::Resident(content) = &mut self.slot {
            content.set_visible(true);
            self.hide_marker();
        } else {
            self.show_marker(scale);
        }
    }

    /// After rendering: schedule a debounced release when the content is
    /// no longer wanted.
    pub fn post_render(&mut self, now: Instant, residency: &ResidencyOptions) {
        if self.pending_release.is_some() {
            return;
        }
        if matches!(self.slot, ContentSlot::Resident(_))
            && self.release_due(now, residency)
        {
            self.pending_release = Some(now + residency.release_delay());
        }
    }

    /// Run a scheduled release whose deadline has passed. The release
    /// condition is checked again at fire time. Returns whether content
    /// was released.
    pub fn run_scheduled_release(
        &mut self,
        now: Instant,
        residency: &ResidencyOptions,
    ) -> bool {
        match self.pending_release {
            Some(deadline) if deadline <= now => {}
            _ => return false,
        }
        self.pending_release = None;
        if !self.release_due(now, residency) {
            return false;
        }
        self.release_content()
    }

    /// Deliver content for the request identified by `ticket`.
    ///
    /// Content for a disposed tile or a superseded request is disposed
    /// immediately.
    pub fn on_content_loaded(
        &mut self,
        ticket: u64,
        mut content: Box<dyn HeavyContent>,
    ) {
        let expected = matches!(
            self.slot,
            ContentSlot::Loading { ticket: t } if t == ticket
        );
        let metadata = match &self.metadata {
            Some(metadata) if expected && !self.disposed => metadata,
            _ => {
                log::debug!("{}: discarding stale content #{ticket}", self.id);
                content.dispose();
                return;
            }
        };

        let model = ModelDescriptor {
            url: metadata.url.clone().unwrap_or_default(),
        };
        content.add_model(&model, metadata);
        content
            .set_watermark(metadata.watermark_text(), metadata.show_watermark);
        content.set_render_order(self.render_order);
        content.set_visible(self.wants_content);
        if self.wants_content {
            self.hide_marker();
        }
        log::debug!("{}: content #{ticket} resident", self.id);
        self.slot = ContentSlot::Resident(content);
    }

    /// Pose a flight to this tile should end at: `standoff` units short of
    /// the tile, on the line from the camera, looking at the tile.
    #[must_use]
    pub fn flight_target(
        &self,
        camera: &Camera,
        flight: &FlightOptions,
        device: DeviceClass,
    ) -> Option<CameraPose> {
        if self.disposed || self.metadata.is_none() {
            return None;
        }
        let target = self.position;
        let dir = (target - camera.eye).normalize_or_zero();
        let position = target - dir * flight.standoff(device);
        Some(CameraPose::new(position, target))
    }

    /// Release marker and content. Idempotent. A load still in flight is
    /// discarded when it resolves.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.marker = None;
        let _ = self.release_content();
        self.slot = ContentSlot::Empty;
        self.metadata = None;
        self.pending_release = None;
        log::debug!("{}: disposed", self.id);
    }

    // ── Internals ──

    fn release_due(&self, now: Instant, residency: &ResidencyOptions) -> bool {
        if !self.active {
            return true;
        }
        self.last_active.is_none_or(|t| {
            now.saturating_duration_since(t) > residency.inactivity_timeout()
        })
    }

    fn release_content(&mut self) -> bool {
        match std::mem::take(&mut self.slot) {
            ContentSlot::Resident(content) => {
                content.dispose();
                log::debug!("{}: content released", self.id);
                true
            }
            other => {
                self.slot = other;
                false
            }
        }
    }

    fn request_content(
        &mut self,
        frame: &FrameContext<'_>,
        loader: &mut dyn HeavyContentLoader,
    ) {
        let Some(metadata) = &self.metadata else {
            return;
        };
        let residency = &frame.options.residency;
        let request = LoadRequest {
            tile: self.id,
            url: metadata.url.clone().unwrap_or_default(),
            matrix: self.world,
            depth_test: false,
            partitioned: metadata.partition_requested(),
            watermark: metadata.watermark_text().to_owned(),
            show_watermark: metadata.show_watermark,
            max_render_count: residency
                .render_ceiling(frame.device(), metadata.is_partitioned()),
            debug_mode: residency.debug_mode(),
        };
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        log::debug!("{}: requesting content #{ticket} {}", self.id, request.url);
        self.slot = ContentSlot::Loading { ticket };
        loader.create(request, frame.loads.completion(self.id, ticket));
    }

    fn show_marker(&mut self, scale: f32) {
        if let Some(marker) = &mut self.marker {
            marker.scale = scale;
            marker.visible = true;
        }
    }

    fn hide_marker(&mut self) {
        if let Some(marker) = &mut self.marker {
            marker.visible = false;
        }
    }
}

impl Drop for TileProxy {
    fn drop(&mut self) {
        self.dispose();
    }
}
