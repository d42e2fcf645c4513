//! Placement and collision engine.
//!
//! Decides whether a candidate `(rack, device type, position, face)` is legal.
//! Every function here is pure: it reads a rack and a [`DeviceTypeLookup`] and
//! returns a verdict (or, for [`plan_placement`], the device to append). The
//! store applies the resulting mutation.
//!
//! Rules, all in internal units:
//!
//! - A device occupies the half-open span `[position, position + height)`.
//! - The rack's usable window is `[U1, U(height + 1))`, i.e.
//!   `[6, (height + 1) * 6)` for a rack of `height` U.
//! - New positions must sit on a mounting hole (multiple of [`HOLE_GRANULARITY`]).
//! - Two spans collide when `a.start < b.end && b.start < a.end`; touching
//!   boundaries do not collide.
//! - Full-depth devices conflict with overlapping devices on either face.
//!   Half-depth devices only conflict with overlapping devices on the same face.

#[cfg(test)]
#[path = "collision_test.rs"]
mod collision_test;

use crate::catalog::{DeviceTypeLookup, WithReplacement};
use crate::consts::{HOLE_GRANULARITY, UNITS_PER_U};
use crate::error::ErrorCode;
use crate::layout::{DeviceType, EntityId, Face, Layout, PlacedDevice, Rack};
use crate::units::{InternalUnit, height_to_internal};

/// Why a placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),
    #[error("position {0} is not on a mounting hole")]
    Misaligned(InternalUnit),
    #[error("span {start}..{end} does not fit in a {rack_height}U rack")]
    OutOfBounds { start: InternalUnit, end: InternalUnit, rack_height: u32 },
    #[error("overlaps device {0}")]
    Overlap(EntityId),
}

impl ErrorCode for PlacementError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownDeviceType(_) => "E_UNKNOWN_DEVICE_TYPE",
            Self::Misaligned(_) => "E_MISALIGNED",
            Self::OutOfBounds { .. } => "E_OUT_OF_BOUNDS",
            Self::Overlap(_) => "E_OVERLAP",
        }
    }
}

/// Half-open range of internal units `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: InternalUnit,
    pub end: InternalUnit,
}

impl Span {
    #[must_use]
    pub fn new(position: InternalUnit, height: InternalUnit) -> Self {
        Self { start: position, end: position.saturating_add(height) }
    }

    /// Open-interval overlap; shared endpoints do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `inner` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, inner: &Span) -> bool {
        inner.start >= self.start && inner.end <= self.end
    }
}

/// Usable window of a rack `height` U tall.
#[must_use]
pub fn rack_bounds(height: u32) -> Span {
    let top = InternalUnit::try_from(height)
        .unwrap_or(InternalUnit::MAX)
        .saturating_add(1)
        .saturating_mul(UNITS_PER_U);
    Span { start: UNITS_PER_U, end: top }
}

/// Span occupied by a device of `device_type` at `position`.
#[must_use]
pub fn span(position: InternalUnit, device_type: &DeviceType) -> Span {
    Span::new(position, height_to_internal(device_type.u_height))
}

/// Whether two devices on the given faces physically compete for the same space.
#[must_use]
pub fn faces_conflict(a_face: Face, a_full_depth: bool, b_face: Face, b_full_depth: bool) -> bool {
    a_full_depth || b_full_depth || a_face == b_face
}

/// Space taken by an existing placement. Dangling placements count as a 1U full-depth obstacle.
struct Occupancy {
    span: Span,
    face: Face,
    full_depth: bool,
}

fn occupancy<L: DeviceTypeLookup + ?Sized>(device: &PlacedDevice, lookup: &L) -> Occupancy {
    match lookup.device_type(&device.device_type) {
        Some(dt) => Occupancy { span: span(device.position, dt), face: device.face, full_depth: dt.is_full_depth },
        None => Occupancy { span: Span::new(device.position, UNITS_PER_U), face: device.face, full_depth: true },
    }
}

/// Devices in `rack` that a device occupying `candidate` on `face` would collide with.
pub fn find_collisions<'r, L: DeviceTypeLookup + ?Sized>(
    rack: &'r Rack,
    lookup: &L,
    candidate: Span,
    face: Face,
    full_depth: bool,
    exclude: Option<&str>,
) -> Vec<&'r PlacedDevice> {
    rack.devices
        .iter()
        .filter(|d| exclude != Some(d.id.as_str()))
        .filter(|d| {
            let other = occupancy(d, lookup);
            faces_conflict(face, full_depth, other.face, other.full_depth) && candidate.overlaps(&other.span)
        })
        .collect()
}

/// Bounds and overlap check, without hole alignment.
fn check_span<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    device_type: &DeviceType,
    position: InternalUnit,
    face: Face,
    exclude: Option<&str>,
) -> Result<(), PlacementError> {
    let candidate = span(position, device_type);
    if !rack_bounds(rack.height).contains(&candidate) {
        return Err(PlacementError::OutOfBounds {
            start: candidate.start,
            end: candidate.end,
            rack_height: rack.height,
        });
    }
    let collisions = find_collisions(rack, lookup, candidate, face, device_type.is_full_depth, exclude);
    match collisions.first() {
        Some(hit) => Err(PlacementError::Overlap(hit.id.clone())),
        None => Ok(()),
    }
}

/// Full check for a new or moved position: alignment, bounds, overlap.
fn check_position<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    device_type: &DeviceType,
    position: InternalUnit,
    face: Face,
    exclude: Option<&str>,
) -> Result<(), PlacementError> {
    if position.rem_euclid(HOLE_GRANULARITY) != 0 {
        return Err(PlacementError::Misaligned(position));
    }
    check_span(rack, lookup, device_type, position, face, exclude)
}

fn resolve<'l, L: DeviceTypeLookup + ?Sized>(lookup: &'l L, slug: &str) -> Result<&'l DeviceType, PlacementError> {
    lookup
        .device_type(slug)
        .ok_or_else(|| PlacementError::UnknownDeviceType(slug.to_string()))
}

/// Check whether a new device of `slug` may be placed at `position` on `face`.
///
/// # Errors
///
/// `UnknownDeviceType`, `Misaligned`, `OutOfBounds`, or `Overlap` naming the
/// first conflicting device.
pub fn validate_placement<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    slug: &str,
    position: InternalUnit,
    face: Face,
) -> Result<(), PlacementError> {
    let device_type = resolve(lookup, slug)?;
    check_position(rack, lookup, device_type, position, face, None)
}

/// Validate a placement and build the device to append, with a fresh id.
///
/// # Errors
///
/// Same as [`validate_placement`].
pub fn plan_placement<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    slug: &str,
    position: InternalUnit,
    face: Face,
) -> Result<PlacedDevice, PlacementError> {
    validate_placement(rack, lookup, slug, position, face)?;
    Ok(PlacedDevice::new(slug, position, face))
}

/// Check moving `device` (already in `rack`) to `position`. The device never collides with itself.
///
/// # Errors
///
/// Same as [`validate_placement`].
pub fn validate_move<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    device: &PlacedDevice,
    position: InternalUnit,
) -> Result<(), PlacementError> {
    let device_type = resolve(lookup, &device.device_type)?;
    check_position(rack, lookup, device_type, position, device.face, Some(&device.id))
}

/// Check flipping `device` to `face` at its current position.
///
/// # Errors
///
/// `UnknownDeviceType`, `OutOfBounds`, or `Overlap`.
pub fn validate_face_change<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    device: &PlacedDevice,
    face: Face,
) -> Result<(), PlacementError> {
    let device_type = resolve(lookup, &device.device_type)?;
    check_span(rack, lookup, device_type, device.position, face, Some(&device.id))
}

/// Check every device already inside `rack` against its own type, alignment,
/// bounds, and the other devices of the rack.
///
/// # Errors
///
/// The first failure in device order: `UnknownDeviceType`, `Misaligned`,
/// `OutOfBounds`, or `Overlap` naming the other device.
pub fn validate_rack_contents<L: DeviceTypeLookup + ?Sized>(rack: &Rack, lookup: &L) -> Result<(), PlacementError> {
    for device in &rack.devices {
        let device_type = resolve(lookup, &device.device_type)?;
        check_position(rack, lookup, device_type, device.position, device.face, Some(&device.id))?;
    }
    Ok(())
}

/// Check that every device in `rack` still fits if the rack becomes `new_height` U tall.
///
/// # Errors
///
/// `OutOfBounds` for the first device that would stick out.
pub fn validate_rack_height<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    new_height: u32,
) -> Result<(), PlacementError> {
    let bounds = rack_bounds(new_height);
    for device in &rack.devices {
        let occupied = occupancy(device, lookup).span;
        if !bounds.contains(&occupied) {
            return Err(PlacementError::OutOfBounds {
                start: occupied.start,
                end: occupied.end,
                rack_height: new_height,
            });
        }
    }
    Ok(())
}

/// Check that every placement of `replacement.slug` still fits once the type
/// takes the replacement's height and depth.
///
/// # Errors
///
/// `OutOfBounds` or `Overlap` for the first placement that would break.
pub fn validate_type_resize(layout: &Layout, replacement: &DeviceType) -> Result<(), PlacementError> {
    let lookup = WithReplacement::new(layout, replacement);
    for rack in &layout.racks {
        for device in rack.devices.iter().filter(|d| d.device_type == replacement.slug) {
            check_span(rack, &lookup, replacement, device.position, device.face, Some(&device.id))?;
        }
    }
    Ok(())
}

/// Whole-U positions (bottom to top) where a device of `slug` could be dropped on `face`.
///
/// # Errors
///
/// `UnknownDeviceType` if `slug` does not resolve.
pub fn valid_positions<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    slug: &str,
    face: Face,
) -> Result<Vec<InternalUnit>, PlacementError> {
    let device_type = resolve(lookup, slug)?;
    let bounds = rack_bounds(rack.height);
    let mut positions = Vec::new();
    let mut position = bounds.start;
    while position < bounds.end {
        if check_position(rack, lookup, device_type, position, face, None).is_ok() {
            positions.push(position);
        }
        position += UNITS_PER_U;
    }
    Ok(positions)
}

/// Lowest whole-U position where a device of `slug` fits on `face`, if any.
///
/// # Errors
///
/// `UnknownDeviceType` if `slug` does not resolve.
pub fn first_free_position<L: DeviceTypeLookup + ?Sized>(
    rack: &Rack,
    lookup: &L,
    slug: &str,
    face: Face,
) -> Result<Option<InternalUnit>, PlacementError> {
    Ok(valid_positions(rack, lookup, slug, face)?.first().copied())
}
