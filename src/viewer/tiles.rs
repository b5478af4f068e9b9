//! Tile registration, document handling and active-tile ranking.

use crate::scene::index::SceneIndex;
use crate::scene::SceneContext;
use crate::tile::{
    DocumentKind, FetchedDocument, HeavyContentLoader, MetadataSource, TileId,
    TileMetadata, TileProxy,
};

use super::MapViewer;

/// Render order of the closest tile; farther tiles count down from here.
const BASE_RENDER_ORDER: i32 = 1000;

impl<S, L, M> MapViewer<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    /// Register the tile whose metadata lives at `url` and start fetching
    /// it. A URL that is already registered returns the existing id.
    pub fn register_tile(&mut self, url: &str) -> Option<TileId> {
        if self.disposed {
            return None;
        }
        if let Some(&id) = self.urls.get(url) {
            log::debug!("{url}: already registered as {id}");
            return Some(id);
        }
        let id = TileId(self.next_tile_id);
        self.next_tile_id += 1;
        let _ = self.urls.insert(url.to_owned(), id);
        let _ = self.tiles.insert(id, TileProxy::new(id, url));
        log::info!("{id}: registered {url}");
        self.source
            .fetch(self.fetches.completion(DocumentKind::Tile(id), url));
        Some(id)
    }

    /// Remove a tile, disposing its marker and content. Returns whether the
    /// tile existed.
    pub fn remove_tile(&mut self, id: TileId) -> bool {
        let Some(mut proxy) = self.tiles.remove(&id) else {
            return false;
        };
        let _ = self.urls.remove(proxy.source_url());
        proxy.dispose();
        log::info!("{id}: removed");
        true
    }

    /// Fetch a scene index document; once it arrives the camera is placed
    /// and every listed tile is registered once.
    pub fn add_scene_index(&mut self, url: &str) {
        if self.disposed {
            return;
        }
        self.source
            .fetch(self.fetches.completion(DocumentKind::SceneIndex, url));
    }

    /// Look up a tile.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&TileProxy> {
        self.tiles.get(&id)
    }

    /// Id of the tile registered for `url`.
    #[must_use]
    pub fn tile_id(&self, url: &str) -> Option<TileId> {
        self.urls.get(url).copied()
    }

    /// All tiles in id order.
    #[must_use]
    pub fn tiles(&self) -> Vec<&TileProxy> {
        let mut tiles: Vec<&TileProxy> = self.tiles.values().collect();
        tiles.sort_by_key(|t| t.id());
        tiles
    }

    /// Number of registered tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub(super) fn apply_document(&mut self, doc: FetchedDocument) {
        match doc.kind {
            DocumentKind::Tile(id) => {
                let body = doc.body.as_deref();
                let metadata = TileMetadata::from_json_or_empty(&doc.url, body);
                let Some(proxy) = self.tiles.get_mut(&id) else {
                    log::debug!("{id}: metadata for removed tile");
                    return;
                };
                let scene = &self.scene;
                let world =
                    metadata.world_matrix(|geo| scene.geo_to_world(geo));
                proxy.apply_metadata(metadata, world);
            }
            DocumentKind::SceneIndex => self.apply_scene_index(&doc),
        }
    }

    fn apply_scene_index(&mut self, doc: &FetchedDocument) {
        let Some(body) = doc.body.as_deref() else {
            log::error!("{}: scene index unavailable", doc.url);
            return;
        };
        let index = match SceneIndex::from_json(body) {
            Ok(index) => index,
            Err(e) => {
                log::error!("{}: {e}", doc.url);
                return;
            }
        };

        let scene = &self.scene;
        let look_at = index
            .look_at
            .and_then(|p| p.resolve(|geo| scene.geo_to_world(geo)));
        let position = index
            .position
            .and_then(|p| p.resolve(|geo| scene.geo_to_world(geo)));
        let camera = self.scene.camera_mut();
        if let Some(target) = look_at {
            camera.target = target;
        }
        if let Some(eye) = position {
            camera.eye = eye;
        }

        let urls = index.unique_scenes();
        log::info!("{}: scene index with {} tiles", doc.url, urls.len());
        for url in urls {
            let _ = self.register_tile(url);
        }
    }

    /// Mark the closest tiles active and give their content draw orders.
    ///
    /// Tiles without metadata are skipped; ties keep id order.
    pub(super) fn rank_tiles(&mut self) {
        let eye = self.scene.camera().eye;
        let max_active =
            self.options.activation.max_active(self.options.device);

        let mut ranked: Vec<(f32, TileId)> = self
            .tiles
            .values()
            .filter(|t| t.metadata().is_some())
            .map(|t| (t.distance_to(eye), t.id()))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (rank, (_, id)) in ranked.into_iter().enumerate() {
            if let Some(proxy) = self.tiles.get_mut(&id) {
                proxy.set_active(rank < max_active);
                let order = i32::try_from(rank)
                    .map_or(i32::MIN, |r| BASE_RENDER_ORDER.saturating_sub(r));
                proxy.set_render_order(order);
            }
        }
    }
}
