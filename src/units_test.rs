#![allow(clippy::float_cmp)]

use super::*;

// --- Conversions ---

#[test]
fn to_internal_whole_units() {
    assert_eq!(to_internal(1.0), 6);
    assert_eq!(to_internal(2.0), 12);
    assert_eq!(to_internal(42.0), 252);
}

#[test]
fn to_internal_fractional_units() {
    assert_eq!(to_internal(0.5), 3);
    assert_eq!(to_internal(1.5), 9);
    assert_eq!(to_internal(1.0 / 3.0), 2);
    assert_eq!(to_internal(2.0 / 3.0), 4);
}

#[test]
fn to_internal_rounds_to_nearest() {
    assert_eq!(to_internal(1.01), 6);
    assert_eq!(to_internal(1.49), 9);
}

#[test]
fn to_human_inverts_whole_units() {
    assert_eq!(to_human(6), 1.0);
    assert_eq!(to_human(9), 1.5);
    assert_eq!(to_human(0), 0.0);
}

#[test]
fn round_trip_every_sixth_up_to_100u() {
    for sixths in 0..=600 {
        let human = f64::from(sixths) / 6.0;
        assert_eq!(to_human(to_internal(human)), human, "sixths={sixths}");
    }
}

#[test]
fn height_to_internal_matches_to_internal() {
    for h in [0.5, 1.0, 2.0, 4.0, 1.5] {
        assert_eq!(height_to_internal(h), to_internal(h));
    }
}

#[test]
fn whole_units_floors() {
    assert_eq!(whole_units(6), 1);
    assert_eq!(whole_units(11), 1);
    assert_eq!(whole_units(12), 2);
}

// --- Formatting ---

#[test]
fn format_whole_position() {
    assert_eq!(format_position(6), "1");
    assert_eq!(format_position(252), "42");
}

#[test]
fn format_hole_aligned_fractions() {
    assert_eq!(format_position(8), "1⅓");
    assert_eq!(format_position(10), "1⅔");
}

#[test]
fn format_height_derived_fractions() {
    assert_eq!(format_position(7), "1⅙");
    assert_eq!(format_position(9), "1½");
    assert_eq!(format_position(11), "1⅚");
}

#[test]
fn format_zero() {
    assert_eq!(format_position(0), "0");
}
