use super::*;
use crate::layout::DeviceCategory;

fn server() -> DeviceType {
    DeviceType::new("server-1u", 1.0, DeviceCategory::Server)
}

#[test]
fn default_is_idle() {
    let mode = PlacementMode::default();
    assert!(!mode.is_placing());
    assert!(mode.pending().is_none());
}

#[test]
fn start_defaults_to_front() {
    let mut mode = PlacementMode::default();
    mode.start_placement(server());
    let pending = mode.pending().unwrap();
    assert_eq!(pending.face, Face::Front);
    assert_eq!(pending.device_type.slug, "server-1u");
}

#[test]
fn start_on_rear() {
    let mut mode = PlacementMode::default();
    mode.start_placement_on(server(), Face::Rear);
    assert_eq!(mode.pending().unwrap().face, Face::Rear);
}

#[test]
fn restart_replaces_pending_device() {
    let mut mode = PlacementMode::default();
    mode.start_placement(server());
    mode.start_placement(DeviceType::new("blank-1u", 1.0, DeviceCategory::Blank));
    assert_eq!(mode.pending().unwrap().device_type.slug, "blank-1u");
}

#[test]
fn set_target_face_only_while_placing() {
    let mut mode = PlacementMode::default();
    assert!(!mode.set_target_face(Face::Rear));
    assert_eq!(mode, PlacementMode::Idle);

    mode.start_placement(server());
    assert!(mode.set_target_face(Face::Rear));
    assert_eq!(mode.pending().unwrap().face, Face::Rear);
}

#[test]
fn cancel_and_complete_reset_identically() {
    let mut cancelled = PlacementMode::default();
    cancelled.start_placement(server());
    let a = cancelled.cancel_placement();

    let mut completed = PlacementMode::default();
    completed.start_placement(server());
    let b = completed.complete_placement();

    assert_eq!(cancelled, PlacementMode::Idle);
    assert_eq!(completed, PlacementMode::Idle);
    assert_eq!(a, b);
}

#[test]
fn cancel_when_idle_returns_none() {
    let mut mode = PlacementMode::default();
    assert!(mode.cancel_placement().is_none());
    assert!(mode.complete_placement().is_none());
}
