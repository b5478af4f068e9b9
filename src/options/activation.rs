use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::DeviceClass;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Activation", inline)]
#[serde(default)]
/// Distance thresholds and marker sizing for tile activation.
pub struct ActivationOptions {
    /// Near cutoff on desktop devices, in world units.
    #[schemars(title = "Near Cutoff (desktop)", range(min = 1.0, max = 500.0))]
    pub near_cutoff_desktop: f32,
    /// Near cutoff on handheld devices, in world units.
    #[schemars(title = "Near Cutoff (handheld)", range(min = 1.0, max = 500.0))]
    pub near_cutoff_handheld: f32,
    /// Marker scale per unit of camera distance.
    #[schemars(title = "Marker Scale", range(min = 0.0001, max = 0.1))]
    pub marker_scale_factor: f32,
    /// How many tiles closest to the camera may be active on desktop.
    #[schemars(title = "Max Active Tiles (desktop)", range(min = 1, max = 200))]
    pub max_active_desktop: usize,
    /// How many tiles closest to the camera may be active on handheld.
    #[schemars(title = "Max Active Tiles (handheld)", range(min = 1, max = 200))]
    pub max_active_handheld: usize,
}

impl ActivationOptions {
    /// Near cutoff for the given device class.
    #[must_use]
    pub fn near_cutoff(&self, device: DeviceClass) -> f32 {
        match device {
            DeviceClass::Desktop => self.near_cutoff_desktop,
            DeviceClass::Handheld => self.near_cutoff_handheld,
        }
    }

    /// Active tile budget for the given device class.
    #[must_use]
    pub fn max_active(&self, device: DeviceClass) -> usize {
        match device {
            DeviceClass::Desktop => self.max_active_desktop,
            DeviceClass::Handheld => self.max_active_handheld,
        }
    }
}

impl Default for ActivationOptions {
    fn default() -> Self {
        Self {
            near_cutoff_desktop: 40.0,
            near_cutoff_handheld: 50.0,
            marker_scale_factor: 0.002,
            max_active_desktop: 20,
            max_active_handheld: 1,
        }
    }
}
