use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Picking", inline)]
#[serde(default)]
/// Hybrid picking tolerances.
pub struct PickingOptions {
    /// Maximum perpendicular ray distance for a splat point to count as hit.
    #[schemars(title = "Splat Pick Radius", range(min = 0.001, max = 1.0))]
    pub splat_radius: f32,
}

impl Default for PickingOptions {
    fn default() -> Self {
        Self { splat_radius: 0.03 }
    }
}
