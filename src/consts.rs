//! Shared numeric constants for the rack model.

use crate::units::InternalUnit;

// ── Unit arithmetic ─────────────────────────────────────────────

/// Internal units per rack unit. LCM of 2 (half-U devices) and 3 (holes per U).
pub const UNITS_PER_U: InternalUnit = 6;

/// Distance between mounting holes in internal units. Placement positions snap to this.
pub const HOLE_GRANULARITY: InternalUnit = 2;

/// Smallest device height in internal units (0.5U).
pub const MIN_DEVICE_HEIGHT: InternalUnit = 3;

/// Largest device height accepted for a device type, in rack units.
pub const MAX_DEVICE_HEIGHT_U: f64 = 100.0;

// ── Racks ───────────────────────────────────────────────────────

/// Height given to new racks when none is configured.
pub const DEFAULT_RACK_HEIGHT: u32 = 42;

/// Upper bound on rack height in rack units.
pub const MAX_RACK_HEIGHT: u32 = 100;

// ── History ─────────────────────────────────────────────────────

/// Number of commands kept on the undo stack before the oldest is evicted.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

// ── Files ───────────────────────────────────────────────────────

/// Layout format version written into saved files.
pub const LAYOUT_FORMAT_VERSION: &str = "1.0";
