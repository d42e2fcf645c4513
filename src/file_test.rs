use super::*;
use crate::layout::{
    DeviceCategory, DeviceType, Face, GroupLayout, Interface, PlacedDevice, Rack, RackGroup, RackWidth,
};

fn sample() -> Layout {
    let mut layout = Layout::new("Lab");
    let mut rack = Rack::new("R1", 42);
    rack.width = RackWidth::TwentyThree;
    rack.desc_units = true;
    let mut device = PlacedDevice::new("acme-box", 6, Face::Rear);
    device.name = Some("box-01".into());
    device.ip = Some("10.0.0.9".into());
    rack.devices.push(device);
    rack.devices.push(PlacedDevice::new("server-1u", 12, Face::Front));
    layout.rack_groups.push(RackGroup {
        id: identity::new_id(),
        name: "Row".into(),
        rack_ids: vec![rack.id.clone()],
        layout: GroupLayout::Row,
    });
    layout.racks.push(rack);

    let mut dt = DeviceType::new("acme-box", 0.5, DeviceCategory::Network);
    dt.manufacturer = Some("Acme".into());
    dt.is_full_depth = false;
    dt.interfaces.push(Interface { name: "eth0".into(), kind: "copper".into(), mgmt_only: None });
    layout.device_types.push(dt);
    layout
}

#[test]
fn round_trip_preserves_layout() {
    let layout = sample();
    let text = to_yaml(&layout).unwrap();
    assert_eq!(from_yaml(&text).unwrap(), layout);
}

#[test]
fn yaml_uses_wire_names() {
    let text = to_yaml(&sample()).unwrap();
    assert!(text.contains("face: rear"));
    assert!(text.contains("width: 23"));
    assert!(text.contains("layout: row"));
    assert!(text.contains("category: network"));
    assert!(text.contains("type: copper"));
    assert!(!text.contains("notes:"));
}

#[test]
fn minimal_document_gets_defaults() {
    let text = "name: Minimal\nracks:\n  - id: r1\n    name: A\n    height: 12\n";
    let layout = from_yaml(text).unwrap();
    assert_eq!(layout.name, "Minimal");
    assert_eq!(layout.version, LAYOUT_FORMAT_VERSION);
    assert!(identity::is_valid_uuid(&layout.id));
    let rack = &layout.racks[0];
    assert_eq!(rack.width, RackWidth::Nineteen);
    assert_eq!(rack.starting_unit, 1);
    assert!(rack.devices.is_empty());
}

#[test]
fn valid_id_is_kept_and_malformed_id_replaced() {
    let kept = from_yaml("id: \"123e4567-e89b-12d3-a456-426614174000\"\nname: A\n").unwrap();
    assert_eq!(kept.id, "123e4567-e89b-12d3-a456-426614174000");

    let replaced = from_yaml("id: \"{123e4567-e89b-12d3-a456-426614174000}\"\nname: A\n").unwrap();
    assert!(identity::is_valid_uuid(&replaced.id));
    assert_ne!(replaced.id, "{123e4567-e89b-12d3-a456-426614174000}");
}

#[test]
fn malformed_documents_are_rejected() {
    let err = from_yaml("racks: [").unwrap_err();
    assert_eq!(err.error_code(), "E_LAYOUT_PARSE");
    assert!(!err.retryable());

    assert!(from_yaml("name: A\nracks:\n  - id: r1\n    name: A\n    height: 12\n    width: 17\n").is_err());
}
