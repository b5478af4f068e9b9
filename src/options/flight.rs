use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use super::DeviceClass;
use crate::util::easing::EasingFunction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Flight", inline)]
#[serde(default)]
/// Camera flight parameters used when a marker is clicked.
pub struct FlightOptions {
    /// Flight duration in milliseconds.
    #[schemars(title = "Duration (ms)", range(min = 0, max = 20000))]
    pub duration_ms: u64,
    /// Distance kept between camera and tile after a desktop flight.
    #[schemars(title = "Standoff (desktop)", range(min = 0.0, max = 100.0))]
    pub standoff_desktop: f32,
    /// Distance kept between camera and tile after a handheld flight.
    #[schemars(title = "Standoff (handheld)", range(min = 0.0, max = 100.0))]
    pub standoff_handheld: f32,
    /// Lowest camera height allowed while flying.
    #[schemars(skip)]
    pub min_height: f32,
    /// Easing curve applied to flight progress.
    #[schemars(skip)]
    pub easing: EasingFunction,
}

impl FlightOptions {
    /// Flight duration as a [`Duration`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Standoff distance for the given device class.
    #[must_use]
    pub fn standoff(&self, device: DeviceClass) -> f32 {
        match device {
            DeviceClass::Desktop => self.standoff_desktop,
            DeviceClass::Handheld => self.standoff_handheld,
        }
    }
}

impl Default for FlightOptions {
    fn default() -> Self {
        Self {
            duration_ms: 3000,
            standoff_desktop: 2.0,
            standoff_handheld: 6.0,
            min_height: 0.1,
            easing: EasingFunction::DEFAULT,
        }
    }
}
