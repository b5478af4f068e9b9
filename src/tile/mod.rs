//! Map tiles: metadata, activation, heavy content and their lifecycle.
//!
//! A tile starts as a bare [`TileProxy`] registered by URL. Once its
//! metadata arrives it gets a world placement and a marker. From then on
//! the proxy's frame hooks decide, from camera distance and the viewer's
//! `active` ranking, when heavy content is requested, shown, hidden and
//! released.

pub mod content;
pub mod gate;
pub mod metadata;
pub mod proxy;
pub mod source;

use std::fmt;

pub use content::{
    ContentPoints, HeavyContent, HeavyContentLoader, LoadChannel,
    LoadCompletion, LoadRequest, LoadedContent, ModelDescriptor,
};
pub use gate::{ActivationGate, Proximity};
pub use metadata::TileMetadata;
pub use proxy::{ContentSlot, FrameContext, Marker, TileProxy};
#[cfg(feature = "http")]
pub use source::HttpMetadataSource;
pub use source::{
    DocumentKind, FetchChannel, FetchCompletion, FetchedDocument,
    MetadataSource, StaticMetadataSource,
};

/// Identifier of a registered tile, unique within one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile#{}", self.0)
    }
}
