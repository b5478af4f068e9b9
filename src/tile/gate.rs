//! Distance gate deciding whether a tile may hold heavy content.

use crate::options::{ActivationOptions, DeviceClass};

/// Outcome of the activation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Proximity {
    /// Beyond the cutoff: show the marker only.
    Far,
    /// Within the cutoff: content may be loaded and shown.
    Near,
}

/// Pure mapping from camera distance and device class to [`Proximity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationGate {
    cutoff_desktop: f32,
    cutoff_handheld: f32,
}

impl Default for ActivationGate {
    fn default() -> Self {
        Self::new(&ActivationOptions::default())
    }
}

impl ActivationGate {
    /// Gate using the configured cutoffs.
    #[must_use]
    pub fn new(options: &ActivationOptions) -> Self {
        Self {
            cutoff_desktop: options.near_cutoff(DeviceClass::Desktop),
            cutoff_handheld: options.near_cutoff(DeviceClass::Handheld),
        }
    }

    /// Cutoff distance for `device`.
    #[must_use]
    pub const fn cutoff(&self, device: DeviceClass) -> f32 {
        match device {
            DeviceClass::Desktop => self.cutoff_desktop,
            DeviceClass::Handheld => self.cutoff_handheld,
        }
    }

    /// `Near` iff `distance <= cutoff(device)`. NaN distances are `Far`.
    #[must_use]
    pub fn classify(&self, distance: f32, device: DeviceClass) -> Proximity {
        if distance <= self.cutoff(device) {
            Proximity::Near
        } else {
            Proximity::Far
        }
    }
}
