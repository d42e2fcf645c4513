//! Layout document model: racks, placed devices, device types, and rack groups.
//!
//! This module defines the plain-data types that make up a layout (`Layout`,
//! `Rack`, `PlacedDevice`, `DeviceType`, `RackGroup`) and the side-effect-free
//! queries over them. Every type is an owned value with no shared mutable
//! substructure, so cloning one produces an independent snapshot. Commands rely
//! on that to capture undo state.
//!
//! Mutation lives elsewhere: `raw` applies unchecked changes for commands and
//! `store` exposes the validated, recorded actions.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_RACK_HEIGHT, LAYOUT_FORMAT_VERSION};
use crate::identity;
use crate::units::InternalUnit;

/// Identifier of a rack, placed device, or rack group (UUID string).
pub type EntityId = String;

/// Mounting side of a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    #[default]
    Front,
    Rear,
}

impl Face {
    /// The opposite mounting side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Rear,
            Self::Rear => Self::Front,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
        }
    }
}

/// Direction air moves through a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Airflow {
    Passive,
    FrontToRear,
    RearToFront,
    LeftToRight,
    RightToLeft,
    SideToRear,
}

/// Broad device category, used for palette grouping and default colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceCategory {
    Server,
    Network,
    PatchPanel,
    Power,
    Storage,
    Kvm,
    AvMedia,
    Cooling,
    Shelf,
    Blank,
    CableManagement,
    #[default]
    Other,
}

/// A network interface exposed by a device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_only: Option<bool>,
}

/// A power inlet on a device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerPort {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_draw: Option<u32>,
}

/// Catalog entry describing a kind of device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    /// Globally unique key referenced by placements.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Height in rack units; may be fractional (e.g. `0.5`).
    pub u_height: f64,
    /// Full-depth devices occupy both faces of the rack.
    #[serde(default = "default_full_depth")]
    pub is_full_depth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow: Option<Airflow>,
    #[serde(default)]
    pub category: DeviceCategory,
    /// CSS colour string.
    pub colour: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub power_ports: Vec<PowerPort>,
}

fn default_full_depth() -> bool {
    true
}

impl DeviceType {
    /// Minimal device type with the given slug and height; everything else defaulted.
    #[must_use]
    pub fn new(slug: impl Into<String>, u_height: f64, category: DeviceCategory) -> Self {
        Self {
            slug: slug.into(),
            manufacturer: None,
            model: None,
            u_height,
            is_full_depth: true,
            airflow: None,
            category,
            colour: default_colour(category).to_string(),
            interfaces: Vec::new(),
            power_ports: Vec::new(),
        }
    }

    /// Human label: `"Manufacturer Model"`, falling back to the slug.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.manufacturer, &self.model) {
            (Some(m), Some(model)) => format!("{m} {model}"),
            (None, Some(model)) => model.clone(),
            _ => self.slug.clone(),
        }
    }
}

/// Default swatch for a category.
#[must_use]
pub fn default_colour(category: DeviceCategory) -> &'static str {
    match category {
        DeviceCategory::Server => "#4A90D9",
        DeviceCategory::Network => "#7B68EE",
        DeviceCategory::PatchPanel => "#808080",
        DeviceCategory::Power => "#DC143C",
        DeviceCategory::Storage => "#228B22",
        DeviceCategory::Kvm => "#FF8C00",
        DeviceCategory::AvMedia => "#9932CC",
        DeviceCategory::Cooling => "#00CED1",
        DeviceCategory::Shelf => "#8B4513",
        DeviceCategory::Blank => "#2F4F4F",
        DeviceCategory::CableManagement => "#696969",
        DeviceCategory::Other => "#A9A9A9",
    }
}

/// A device instance mounted in a rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedDevice {
    /// Unique within the owning rack.
    pub id: EntityId,
    /// Slug of the device type. Weak reference: it may dangle.
    pub device_type: String,
    /// Lowest occupied internal unit (human U1 is `6`).
    pub position: InternalUnit,
    pub face: Face,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_override: Option<String>,
}

impl PlacedDevice {
    /// A device with a fresh id and no per-placement overrides.
    #[must_use]
    pub fn new(device_type: impl Into<String>, position: InternalUnit, face: Face) -> Self {
        Self {
            id: identity::new_id(),
            device_type: device_type.into(),
            position,
            face,
            name: None,
            notes: None,
            ip: None,
            colour_override: None,
            image_override: None,
        }
    }

    /// The editable, non-geometric details of this placement.
    #[must_use]
    pub fn details(&self) -> DeviceDetails {
        DeviceDetails {
            name: self.name.clone(),
            notes: self.notes.clone(),
            ip: self.ip.clone(),
            colour_override: self.colour_override.clone(),
            image_override: self.image_override.clone(),
        }
    }

    /// Overwrite the non-geometric details of this placement.
    pub fn set_details(&mut self, details: DeviceDetails) {
        self.name = details.name;
        self.notes = details.notes;
        self.ip = details.ip;
        self.colour_override = details.colour_override;
        self.image_override = details.image_override;
    }
}

/// Non-geometric per-placement fields: rename, notes, IP, recolour, image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDetails {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub ip: Option<String>,
    pub colour_override: Option<String>,
    pub image_override: Option<String>,
}

/// Nominal rack width in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RackWidth {
    Ten,
    #[default]
    Nineteen,
    TwentyOne,
    TwentyThree,
}

impl TryFrom<u32> for RackWidth {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(Self::Ten),
            19 => Ok(Self::Nineteen),
            21 => Ok(Self::TwentyOne),
            23 => Ok(Self::TwentyThree),
            other => Err(format!("unsupported rack width: {other}")),
        }
    }
}

impl From<RackWidth> for u32 {
    fn from(width: RackWidth) -> Self {
        match width {
            RackWidth::Ten => 10,
            RackWidth::Nineteen => 19,
            RackWidth::TwentyOne => 21,
            RackWidth::TwentyThree => 23,
        }
    }
}

/// Physical construction of a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormFactor {
    #[serde(rename = "2-post-frame")]
    TwoPostFrame,
    #[serde(rename = "4-post-frame")]
    FourPostFrame,
    #[default]
    #[serde(rename = "4-post-cabinet")]
    FourPostCabinet,
    WallFrame,
    WallCabinet,
    OpenFrame,
}

/// A rack and the devices mounted in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    pub id: EntityId,
    pub name: String,
    /// Height in whole rack units.
    pub height: u32,
    #[serde(default)]
    pub width: RackWidth,
    #[serde(default)]
    pub form_factor: FormFactor,
    /// Whether unit numbering descends from the top.
    #[serde(default)]
    pub desc_units: bool,
    /// Number shown for the first unit.
    #[serde(default = "default_starting_unit")]
    pub starting_unit: u32,
    /// Insertion order; spatial order is derived.
    #[serde(default)]
    pub devices: Vec<PlacedDevice>,
}

fn default_starting_unit() -> u32 {
    1
}

impl Rack {
    /// An empty 19" cabinet with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, height: u32) -> Self {
        Self {
            id: identity::new_id(),
            name: name.into(),
            height,
            width: RackWidth::default(),
            form_factor: FormFactor::default(),
            desc_units: false,
            starting_unit: default_starting_unit(),
            devices: Vec::new(),
        }
    }

    /// Find a placed device by id.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&PlacedDevice> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    /// Index of a placed device within `devices`.
    #[must_use]
    pub fn device_index(&self, device_id: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.id == device_id)
    }

    /// Everything about the rack except its devices.
    #[must_use]
    pub fn properties(&self) -> RackProperties {
        RackProperties {
            name: self.name.clone(),
            height: self.height,
            width: self.width,
            form_factor: self.form_factor,
            desc_units: self.desc_units,
            starting_unit: self.starting_unit,
        }
    }

    /// Overwrite everything about the rack except its id and devices.
    pub fn set_properties(&mut self, props: RackProperties) {
        self.name = props.name;
        self.height = props.height;
        self.width = props.width;
        self.form_factor = props.form_factor;
        self.desc_units = props.desc_units;
        self.starting_unit = props.starting_unit;
    }

    /// Displayed number for the 1-indexed unit `u` (counted from the bottom),
    /// honouring `starting_unit` and `desc_units`.
    #[must_use]
    pub fn unit_label(&self, u: u32) -> u32 {
        let offset = if self.desc_units {
            self.height.saturating_sub(u)
        } else {
            u.saturating_sub(1)
        };
        self.starting_unit + offset
    }
}

/// Editable rack settings, excluding id and devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackProperties {
    pub name: String,
    pub height: u32,
    pub width: RackWidth,
    pub form_factor: FormFactor,
    pub desc_units: bool,
    pub starting_unit: u32,
}

impl Default for RackProperties {
    fn default() -> Self {
        Self {
            name: String::from("Rack"),
            height: DEFAULT_RACK_HEIGHT,
            width: RackWidth::default(),
            form_factor: FormFactor::default(),
            desc_units: false,
            starting_unit: default_starting_unit(),
        }
    }
}

/// How racks in a group are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupLayout {
    /// Side-by-side racks bolted into one logical unit.
    #[default]
    Bayed,
    /// Plain row grouping.
    Row,
}

/// A named, ordered set of racks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackGroup {
    pub id: EntityId,
    pub name: String,
    pub rack_ids: Vec<EntityId>,
    #[serde(default)]
    pub layout: GroupLayout,
}

/// Primary visual for devices in the rack view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    Label,
    Image,
    ImageLabel,
}

/// Placement field shown as an annotation next to each device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationField {
    #[default]
    Name,
    Ip,
    Notes,
    Manufacturer,
}

/// Display-only preferences saved with the layout.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub show_labels_on_images: bool,
    #[serde(default)]
    pub show_annotations: bool,
    #[serde(default)]
    pub annotation_field: AnnotationField,
}

/// The top-level document: the unit of save, load, and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default = "default_version")]
    pub version: String,
    /// Storage identity (UUID, 8-4-4-4-12 hex).
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Display order.
    #[serde(default)]
    pub racks: Vec<Rack>,
    #[serde(default)]
    pub rack_groups: Vec<RackGroup>,
    /// Custom (user-defined) device types owned by this layout.
    #[serde(default)]
    pub device_types: Vec<DeviceType>,
    #[serde(default)]
    pub settings: LayoutSettings,
}

fn default_version() -> String {
    LAYOUT_FORMAT_VERSION.to_string()
}

/// A placement whose device type cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingPlacement {
    pub rack_id: EntityId,
    pub device_id: EntityId,
    pub device_type: String,
}

impl Layout {
    /// An empty layout with a fresh identity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            id: identity::new_id(),
            name: name.into(),
            racks: Vec::new(),
            rack_groups: Vec::new(),
            device_types: Vec::new(),
            settings: LayoutSettings::default(),
        }
    }

    // --- Racks ---

    #[must_use]
    pub fn get_rack_by_id(&self, rack_id: &str) -> Option<&Rack> {
        self.racks.iter().find(|r| r.id == rack_id)
    }

    #[must_use]
    pub fn rack_index(&self, rack_id: &str) -> Option<usize> {
        self.racks.iter().position(|r| r.id == rack_id)
    }

    // --- Groups ---

    #[must_use]
    pub fn get_rack_group(&self, group_id: &str) -> Option<&RackGroup> {
        self.rack_groups.iter().find(|g| g.id == group_id)
    }

    #[must_use]
    pub fn rack_group_index(&self, group_id: &str) -> Option<usize> {
        self.rack_groups.iter().position(|g| g.id == group_id)
    }

    /// The group containing `rack_id`, if any. A rack belongs to at most one group.
    #[must_use]
    pub fn get_rack_group_for_rack(&self, rack_id: &str) -> Option<&RackGroup> {
        self.rack_groups
            .iter()
            .find(|g| g.rack_ids.iter().any(|id| id == rack_id))
    }

    // --- Device types ---

    /// A custom device type owned by this layout.
    #[must_use]
    pub fn custom_device_type(&self, slug: &str) -> Option<&DeviceType> {
        self.device_types.iter().find(|dt| dt.slug == slug)
    }

    #[must_use]
    pub fn custom_device_type_index(&self, slug: &str) -> Option<usize> {
        self.device_types.iter().position(|dt| dt.slug == slug)
    }

    /// Every placement of `slug`, as `(rack, device)` pairs in display order.
    #[must_use]
    pub fn get_placed_devices_for_type(&self, slug: &str) -> Vec<(&Rack, &PlacedDevice)> {
        self.racks
            .iter()
            .flat_map(|rack| {
                rack.devices
                    .iter()
                    .filter(move |d| d.device_type == slug)
                    .map(move |d| (rack, d))
            })
            .collect()
    }

    #[must_use]
    pub fn has_device_type_placements(&self, slug: &str) -> bool {
        self.racks
            .iter()
            .any(|rack| rack.devices.iter().any(|d| d.device_type == slug))
    }

    /// Distinct device-type slugs referenced by any placement, sorted.
    #[must_use]
    pub fn get_used_device_type_slugs(&self) -> BTreeSet<String> {
        self.racks
            .iter()
            .flat_map(|rack| rack.devices.iter().map(|d| d.device_type.clone()))
            .collect()
    }

    #[must_use]
    pub fn total_device_count(&self) -> usize {
        self.racks.iter().map(|r| r.devices.len()).sum()
    }

    /// Locate a placed device anywhere in the layout.
    #[must_use]
    pub fn find_device(&self, device_id: &str) -> Option<(&Rack, &PlacedDevice)> {
        self.racks
            .iter()
            .find_map(|rack| rack.device(device_id).map(|d| (rack, d)))
    }
}
