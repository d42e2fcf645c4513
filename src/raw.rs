//! Unchecked layout mutators used by commands.
//!
//! Raw mutators apply a change unconditionally: validation already happened
//! when the command was built. Both `execute` and `undo` go through this
//! surface, so undo reproduces the captured prior state instead of
//! re-deriving it. The trait is crate-private; code outside the crate can only
//! mutate through the recorded actions on `LayoutStore`.
//!
//! A raw mutator whose target is missing logs a warning and does nothing.

#[cfg(test)]
#[path = "raw_test.rs"]
mod raw_test;

use crate::layout::{DeviceType, Layout, PlacedDevice, Rack, RackGroup, RackProperties};
use crate::units::InternalUnit;

pub(crate) trait RawMutations {
    // --- Devices ---
    fn place_device_raw(&mut self, rack_id: &str, index: usize, device: PlacedDevice);
    fn remove_device_at_index_raw(&mut self, rack_id: &str, index: usize) -> Option<PlacedDevice>;
    fn move_device_raw(&mut self, rack_id: &str, device_id: &str, position: InternalUnit);
    fn replace_device_raw(&mut self, rack_id: &str, device: PlacedDevice);

    // --- Racks ---
    fn add_rack_raw(&mut self, index: usize, rack: Rack);
    fn delete_rack_raw(&mut self, rack_id: &str) -> Option<Rack>;
    fn update_rack_raw(&mut self, rack_id: &str, props: RackProperties);
    fn replace_rack_raw(&mut self, rack_id: &str, rack: Rack);

    // --- Device types ---
    fn add_device_type_raw(&mut self, index: usize, device_type: DeviceType);
    fn update_device_type_raw(&mut self, device_type: DeviceType);
    fn delete_device_type_raw(&mut self, slug: &str) -> Option<DeviceType>;

    // --- Groups ---
    fn create_rack_group_raw(&mut self, index: usize, group: RackGroup);
    fn update_rack_group_raw(&mut self, group: RackGroup);
    fn delete_rack_group_raw(&mut self, group_id: &str) -> Option<RackGroup>;
    fn insert_rack_into_group_raw(&mut self, group_id: &str, index: usize, rack_id: &str);
    fn remove_rack_from_group_raw(&mut self, group_id: &str, rack_id: &str);

    // --- Layout ---
    fn set_layout_name_raw(&mut self, name: String);
}

impl Layout {
    fn rack_mut(&mut self, rack_id: &str) -> Option<&mut Rack> {
        let rack = self.racks.iter_mut().find(|r| r.id == rack_id);
        if rack.is_none() {
            tracing::warn!(rack_id, "raw mutation on missing rack");
        }
        rack
    }

    fn group_mut(&mut self, group_id: &str) -> Option<&mut RackGroup> {
        let group = self.rack_groups.iter_mut().find(|g| g.id == group_id);
        if group.is_none() {
            tracing::warn!(group_id, "raw mutation on missing rack group");
        }
        group
    }
}

impl RawMutations for Layout {
    fn place_device_raw(&mut self, rack_id: &str, index: usize, device: PlacedDevice) {
        if let Some(rack) = self.rack_mut(rack_id) {
            let index = index.min(rack.devices.len());
            rack.devices.insert(index, device);
        }
    }

    fn remove_device_at_index_raw(&mut self, rack_id: &str, index: usize) -> Option<PlacedDevice> {
        let rack = self.rack_mut(rack_id)?;
        if index < rack.devices.len() {
            Some(rack.devices.remove(index))
        } else {
            tracing::warn!(rack_id, index, "raw device removal out of range");
            None
        }
    }

    fn move_device_raw(&mut self, rack_id: &str, device_id: &str, position: InternalUnit) {
        let Some(rack) = self.rack_mut(rack_id) else {
            return;
        };
        match rack.devices.iter_mut().find(|d| d.id == device_id) {
            Some(device) => device.position = position,
            None => tracing::warn!(rack_id, device_id, "raw move of missing device"),
        }
    }

    fn replace_device_raw(&mut self, rack_id: &str, device: PlacedDevice) {
        let Some(rack) = self.rack_mut(rack_id) else {
            return;
        };
        match rack.devices.iter_mut().find(|d| d.id == device.id) {
            Some(slot) => *slot = device,
            None => tracing::warn!(rack_id, device_id = %device.id, "raw replace of missing device"),
        }
    }

    fn add_rack_raw(&mut self, index: usize, rack: Rack) {
        let index = index.min(self.racks.len());
        self.racks.insert(index, rack);
    }

    fn delete_rack_raw(&mut self, rack_id: &str) -> Option<Rack> {
        let Some(index) = self.rack_index(rack_id) else {
            tracing::warn!(rack_id, "raw delete of missing rack");
            return None;
        };
        Some(self.racks.remove(index))
    }

    fn update_rack_raw(&mut self, rack_id: &str, props: RackProperties) {
        if let Some(rack) = self.rack_mut(rack_id) {
            rack.set_properties(props);
        }
    }

    fn replace_rack_raw(&mut self, rack_id: &str, rack: Rack) {
        if let Some(slot) = self.rack_mut(rack_id) {
            *slot = rack;
        }
    }

    fn add_device_type_raw(&mut self, index: usize, device_type: DeviceType) {
        let index = index.min(self.device_types.len());
        self.device_types.insert(index, device_type);
    }

    fn update_device_type_raw(&mut self, device_type: DeviceType) {
        match self.device_types.iter_mut().find(|dt| dt.slug == device_type.slug) {
            Some(slot) => *slot = device_type,
            None => tracing::warn!(slug = %device_type.slug, "raw update of missing device type"),
        }
    }

    fn delete_device_type_raw(&mut self, slug: &str) -> Option<DeviceType> {
        let Some(index) = self.custom_device_type_index(slug) else {
            tracing::warn!(slug, "raw delete of missing device type");
            return None;
        };
        Some(self.device_types.remove(index))
    }

    fn create_rack_group_raw(&mut self, index: usize, group: RackGroup) {
        let index = index.min(self.rack_groups.len());
        self.rack_groups.insert(index, group);
    }

    fn update_rack_group_raw(&mut self, group: RackGroup) {
        if let Some(slot) = self.group_mut(&group.id) {
            *slot = group;
        }
    }

    fn delete_rack_group_raw(&mut self, group_id: &str) -> Option<RackGroup> {
        let Some(index) = self.rack_group_index(group_id) else {
            tracing::warn!(group_id, "raw delete of missing rack group");
            return None;
        };
        Some(self.rack_groups.remove(index))
    }

    fn insert_rack_into_group_raw(&mut self, group_id: &str, index: usize, rack_id: &str) {
        if let Some(group) = self.group_mut(group_id) {
            let index = index.min(group.rack_ids.len());
            group.rack_ids.insert(index, rack_id.to_string());
        }
    }

    fn remove_rack_from_group_raw(&mut self, group_id: &str, rack_id: &str) {
        if let Some(group) = self.group_mut(group_id) {
            group.rack_ids.retain(|id| id != rack_id);
        }
    }

    fn set_layout_name_raw(&mut self, name: String) {
        self.name = name;
    }
}
