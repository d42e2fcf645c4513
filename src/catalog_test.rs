#![allow(clippy::float_cmp)]

use super::*;
use crate::layout::{Face, PlacedDevice, Rack};

fn custom(slug: &str, u_height: f64) -> DeviceType {
    DeviceType::new(slug, u_height, DeviceCategory::Other)
}

// --- Starter library ---

#[test]
fn starter_slugs_are_unique() {
    let lib = starter_library();
    let mut slugs: Vec<&str> = lib.iter().map(|dt| dt.slug.as_str()).collect();
    slugs.sort_unstable();
    slugs.dedup();
    assert_eq!(slugs.len(), lib.len());
}

#[test]
fn starter_heights_are_at_least_half_u() {
    for dt in starter_library() {
        assert!(dt.u_height >= 0.5, "{}", dt.slug);
    }
}

#[test]
fn starter_lookup_by_slug() {
    let dt = starter_device_type("server-2u").unwrap();
    assert_eq!(dt.u_height, 2.0);
    assert!(dt.is_full_depth);
    assert!(is_starter_slug("blank-1u"));
    assert!(!is_starter_slug("nope"));
}

// --- Layout lookup ---

#[test]
fn layout_resolves_custom_before_starter() {
    let mut layout = Layout::new("L");
    layout.device_types.push(custom("server-1u", 3.0));
    assert_eq!(layout.device_type("server-1u").unwrap().u_height, 3.0);
}

#[test]
fn layout_falls_back_to_starter() {
    let layout = Layout::new("L");
    assert!(layout.device_type("switch-1u").is_some());
    assert!(layout.device_type("missing").is_none());
}

#[test]
fn replacement_overrides_only_its_slug() {
    let mut layout = Layout::new("L");
    layout.device_types.push(custom("box", 1.0));
    let bigger = custom("box", 4.0);
    let lookup = WithReplacement::new(&layout, &bigger);
    assert_eq!(lookup.device_type("box").unwrap().u_height, 4.0);
    assert_eq!(lookup.device_type("server-2u").unwrap().u_height, 2.0);
}

// --- Dangling placements ---

#[test]
fn dangling_placements_reported() {
    let mut layout = Layout::new("L");
    let mut rack = Rack::new("R", 42);
    rack.devices.push(PlacedDevice::new("server-1u", 6, Face::Front));
    let ghost = PlacedDevice::new("deleted-type", 12, Face::Front);
    let ghost_id = ghost.id.clone();
    rack.devices.push(ghost);
    let rack_id = rack.id.clone();
    layout.racks.push(rack);

    let dangling = layout.dangling_placements();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].rack_id, rack_id);
    assert_eq!(dangling[0].device_id, ghost_id);
    assert_eq!(dangling[0].device_type, "deleted-type");
}
