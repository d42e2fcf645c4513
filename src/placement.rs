//! Tap-to-place mode: the transient "device waiting to be placed" state.
//!
//! On touch devices the user picks a device from the palette first and then
//! taps a rack slot. Between those taps the pending device lives here, outside
//! the committed layout. The machine is never part of undo history; committing
//! a placement issues an ordinary recorded placement through the store.
//!
//! ```text
//!            start_placement(device, face)
//!   Idle ────────────────────────────────▶ Placing { device, face }
//!    ▲                                         │  set_target_face(face)
//!    └──── cancel_placement / complete_placement
//! ```

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::layout::{DeviceType, Face};

/// The device being carried and the face it will mount on.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    pub device_type: DeviceType,
    pub face: Face,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PlacementMode {
    #[default]
    Idle,
    Placing(PendingPlacement),
}

impl PlacementMode {
    /// Begin carrying `device_type`, targeting the front face.
    pub fn start_placement(&mut self, device_type: DeviceType) {
        self.start_placement_on(device_type, Face::Front);
    }

    /// Begin carrying `device_type` toward `face`. Replaces any pending device.
    pub fn start_placement_on(&mut self, device_type: DeviceType, face: Face) {
        tracing::debug!(slug = %device_type.slug, face = face.as_str(), "placement started");
        *self = Self::Placing(PendingPlacement { device_type, face });
    }

    /// Retarget the pending device. Returns `false` (and does nothing) when idle.
    pub fn set_target_face(&mut self, face: Face) -> bool {
        match self {
            Self::Placing(pending) => {
                pending.face = face;
                true
            }
            Self::Idle => false,
        }
    }

    /// Abandon the pending device.
    pub fn cancel_placement(&mut self) -> Option<PendingPlacement> {
        self.take()
    }

    /// Finish after the caller has committed the placement. Resets exactly like cancel.
    pub fn complete_placement(&mut self) -> Option<PendingPlacement> {
        self.take()
    }

    #[must_use]
    pub fn is_placing(&self) -> bool {
        matches!(self, Self::Placing(_))
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingPlacement> {
        match self {
            Self::Placing(pending) => Some(pending),
            Self::Idle => None,
        }
    }

    fn take(&mut self) -> Option<PendingPlacement> {
        match std::mem::take(self) {
            Self::Placing(pending) => Some(pending),
            Self::Idle => None,
        }
    }
}
