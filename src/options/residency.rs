use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use super::DeviceClass;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Residency", inline)]
#[serde(default)]
/// Heavy-content lifetime, render budgets and frame pacing.
pub struct ResidencyOptions {
    /// Delay between deciding to release content and releasing it.
    #[schemars(title = "Release Delay (ms)", range(min = 0, max = 1000))]
    pub release_delay_ms: u64,
    /// Content of an active tile is released after this long without the
    /// tile being Near.
    #[schemars(title = "Inactivity Timeout (s)", range(min = 1, max = 3600))]
    pub inactivity_timeout_secs: u64,
    /// Render ceiling for unpartitioned content (all devices).
    #[schemars(skip)]
    pub max_render_count: u32,
    /// Render ceiling for partitioned content on desktop.
    #[schemars(skip)]
    pub max_render_count_partitioned_desktop: u32,
    /// Render ceiling for partitioned content on handheld.
    #[schemars(skip)]
    pub max_render_count_partitioned_handheld: u32,
    /// Minimum time between two viewer updates, in milliseconds.
    #[schemars(title = "Frame Interval (ms)", range(min = 0, max = 1000))]
    pub frame_interval_ms: u64,
    /// Origin of the hosting page (e.g. `https://maps.example.com`).
    /// Insecure and `test.` hosts enable loader debug mode.
    #[schemars(skip)]
    pub host_origin: String,
    /// Explicit debug-mode override; `None` derives it from the origin.
    #[schemars(skip)]
    pub debug_mode: Option<bool>,
}

impl ResidencyOptions {
    /// Release debounce delay.
    #[must_use]
    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    /// Inactivity timeout after which resident content is released.
    #[must_use]
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    /// Minimum time between two viewer updates.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Render ceiling handed to the content loader.
    #[must_use]
    pub fn render_ceiling(&self, device: DeviceClass, partitioned: bool) -> u32 {
        match (partitioned, device) {
            (false, _) => self.max_render_count,
            (true, DeviceClass::Desktop) => {
                self.max_render_count_partitioned_desktop
            }
            (true, DeviceClass::Handheld) => {
                self.max_render_count_partitioned_handheld
            }
        }
    }

    /// Whether the content loader runs in debug mode.
    #[must_use]
    pub fn debug_mode(&self) -> bool {
        self.debug_mode
            .unwrap_or_else(|| is_debug_origin(&self.host_origin))
    }
}

impl Default for ResidencyOptions {
    fn default() -> Self {
        Self {
            release_delay_ms: 5,
            inactivity_timeout_secs: 60,
            max_render_count: 4_000_000,
            max_render_count_partitioned_desktop: 3_200_000,
            max_render_count_partitioned_handheld: 1_310_720,
            frame_interval_ms: 30,
            host_origin: String::new(),
            debug_mode: None,
        }
    }
}

/// Debug mode is on for plain-http origins and hosts named `test.*`.
#[must_use]
pub fn is_debug_origin(origin: &str) -> bool {
    if origin.starts_with("http:") {
        return true;
    }
    let host = origin.split_once("://").map_or(origin, |(_, rest)| rest);
    host.starts_with("test.")
}
