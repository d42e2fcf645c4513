//! Position arithmetic between human rack units and internal units.
//!
//! Every stored position and height is an integer count of internal units,
//! where one rack unit (U) is [`UNITS_PER_U`] internal units. Six is the
//! smallest count that represents both half-U device heights and the three
//! mounting holes per U exactly, so all collision math stays in integers.
//! Human-facing U values (possibly fractional) are a display projection.

#[cfg(test)]
#[path = "units_test.rs"]
mod units_test;

use crate::consts::UNITS_PER_U;

/// Integer position or height measured in sixths of a rack unit.
pub type InternalUnit = i32;

/// Convert a human rack-unit value (e.g. `1.5`) to internal units.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_internal(human_u: f64) -> InternalUnit {
    (human_u * f64::from(UNITS_PER_U)).round() as InternalUnit
}

/// Convert internal units back to a human rack-unit value.
#[must_use]
pub fn to_human(internal: InternalUnit) -> f64 {
    f64::from(internal) / f64::from(UNITS_PER_U)
}

/// Convert a device height in rack units to internal units.
#[must_use]
pub fn height_to_internal(height_u: f64) -> InternalUnit {
    to_internal(height_u)
}

/// Whole-U part of an internal position.
#[must_use]
pub fn whole_units(internal: InternalUnit) -> InternalUnit {
    internal.div_euclid(UNITS_PER_U)
}

/// Render an internal position as a U label, e.g. `12` -> `"2"`, `9` -> `"1½"`.
///
/// Only remainders 2 and 4 are reachable by placement (hole granularity);
/// 1, 3 and 5 come from height arithmetic and are still rendered rather than
/// rejected so files carrying them stay displayable.
#[must_use]
pub fn format_position(internal: InternalUnit) -> String {
    let whole = whole_units(internal);
    let glyph = match internal.rem_euclid(UNITS_PER_U) {
        1 => "⅙",
        2 => "⅓",
        3 => "½",
        4 => "⅔",
        5 => "⅚",
        _ => "",
    };
    format!("{whole}{glyph}")
}
