//! Centralized viewer options with TOML preset support.
//!
//! All tweakable settings (activation thresholds, flight parameters,
//! picking tolerance, residency timers and budgets) are consolidated here.
//! Options serialize to/from TOML so a deployment can ship presets per
//! device class.

mod activation;
mod flight;
mod picking;
mod residency;

use std::path::Path;

pub use activation::ActivationOptions;
pub use flight::FlightOptions;
pub use picking::PickingOptions;
pub use residency::{is_debug_origin, ResidencyOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SplatMapError;

/// Class of device the viewer runs on.
///
/// Handheld devices get larger activation margins, smaller active-tile
/// budgets and a longer flight standoff.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Desktop or laptop with a pointer.
    #[default]
    Desktop,
    /// Phone or tablet.
    Handheld,
}

impl DeviceClass {
    /// Classify a browser user agent (`"Mobi"` marks handheld devices).
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("Mobi") {
            Self::Handheld
        } else {
            Self::Desktop
        }
    }

    /// Whether this is a handheld device.
    #[must_use]
    pub fn is_handheld(self) -> bool {
        self == Self::Handheld
    }
}

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[flight]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Device class the viewer runs on.
    pub device: DeviceClass,
    /// Activation thresholds and marker sizing.
    pub activation: ActivationOptions,
    /// Camera flight parameters.
    pub flight: FlightOptions,
    /// Hybrid picking tolerances.
    pub picking: PickingOptions,
    /// Heavy-content lifetime and budgets.
    pub residency: ResidencyOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SplatMapError> {
        let content =
            std::fs::read_to_string(path).map_err(SplatMapError::Io)?;
        toml::from_str(&content)
            .map_err(|e| SplatMapError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SplatMapError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SplatMapError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SplatMapError::Io)?;
        }
        std::fs::write(path, content).map_err(SplatMapError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Defaults tuned for the given device class.
    #[must_use]
    pub fn for_device(device: DeviceClass) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }
}
