//! Read-only queries: picking and view tests over the live tiles.

use glam::Vec3;

use crate::picking::{HybridPicker, SplatPoints};
use crate::scene::SceneContext;
use crate::tile::{
    ContentPoints, HeavyContentLoader, MetadataSource, TileId, TileProxy,
};

use super::MapViewer;

/// Relative clip-space margin for [`MapViewer::tiles_in_view`].
const VIEW_MARGIN: f32 = 1.1;

impl<S, L, M> MapViewer<S, L, M>
where
    S: SceneContext,
    L: HeavyContentLoader,
    M: MetadataSource,
{
    /// Every surface and splat hit under the client-space point `(x, y)`,
    /// nearest first. Visible tile content takes part in the splat pass;
    /// content hidden behind its marker does not.
    #[must_use]
    pub fn pick(&self, x: f32, y: f32) -> Vec<Vec3> {
        let ray = HybridPicker::ray_at(&self.scene, x, y);
        let contents: Vec<ContentPoints<'_>> = self
            .tiles
            .values()
            .filter_map(TileProxy::content)
            .filter(|c| c.is_visible())
            .map(ContentPoints)
            .collect();
        let mut splats = self.scene.splats();
        splats.extend(contents.iter().map(|c| -> &dyn SplatPoints { c }));
        self.picker
            .pick_along(&ray, &self.scene.surfaces(), &splats)
    }

    /// Perpendicular distance from the pick ray under `(x, y)` to `point`.
    #[must_use]
    pub fn ray_distance_to_point(&self, x: f32, y: f32, point: Vec3) -> f32 {
        HybridPicker::ray_distance_to_point(&self.scene, x, y, point)
    }

    /// The tile whose resident content is visible and closest to the
    /// camera.
    #[must_use]
    pub fn nearest_visible_content(&self) -> Option<TileId> {
        let eye = self.scene.camera().eye;
        self.tiles
            .values()
            .filter(|t| t.content().is_some_and(|c| c.is_visible()))
            .min_by(|a, b| {
                a.distance_to(eye)
                    .total_cmp(&b.distance_to(eye))
                    .then(a.id().cmp(&b.id()))
            })
            .map(TileProxy::id)
    }

    /// Tiles whose origin lies inside the view (with a small margin), in
    /// id order.
    #[must_use]
    pub fn tiles_in_view(&self) -> Vec<TileId> {
        let camera = self.scene.camera();
        let mut ids: Vec<TileId> = self
            .tiles
            .values()
            .filter(|t| t.metadata().is_some())
            .filter(|t| camera.is_in_view(t.position(), VIEW_MARGIN))
            .map(TileProxy::id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
