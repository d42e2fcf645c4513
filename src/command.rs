//! Reversible commands wrapping every recorded layout mutation.
//!
//! DESIGN
//! ======
//! A `Command` is metadata (kind tag, description, timestamp) around a
//! `CommandOp`, which holds owned snapshots of whatever it needs to apply and
//! revert itself. Snapshots are cloned out of the live layout when the command
//! is built; the layout types have no shared substructure, so later edits to
//! the live store cannot reach into history.
//!
//! `apply` and `revert` call raw mutators only. A command replayed during
//! undo or redo therefore never records another command.
//!
//! Invariants:
//! - `apply` followed by `revert` restores the prior layout exactly.
//! - `revert` followed by `apply` restores the post-command layout exactly.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::layout::{DeviceType, EntityId, Layout, PlacedDevice, Rack, RackGroup, RackProperties};
use crate::raw::RawMutations;
use crate::units::InternalUnit;

/// Type tag of a command, for UI labels and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddDevice,
    RemoveDevice,
    MoveDevice,
    UpdateDevice,
    AddRack,
    DeleteRack,
    UpdateRack,
    ReplaceRack,
    AddDeviceType,
    UpdateDeviceType,
    DeleteDeviceType,
    CreateRackGroup,
    UpdateRackGroup,
    DeleteRackGroup,
    AddRackToGroup,
    RemoveRackFromGroup,
    RenameLayout,
    Batch,
}

/// Effect on a rack's group when the rack leaves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDeparture {
    /// The rack was removed from `group_id` at `index`; the group survives.
    Removed { group_id: EntityId, index: usize },
    /// The rack was the last member, so the whole group was deleted.
    Dissolved { group_index: usize, group: RackGroup },
}

impl GroupDeparture {
    /// How `rack_id` would leave its current group, if it has one.
    #[must_use]
    pub fn for_rack(layout: &Layout, rack_id: &str) -> Option<Self> {
        let group_index = layout
            .rack_groups
            .iter()
            .position(|g| g.rack_ids.iter().any(|id| id == rack_id))?;
        let group = &layout.rack_groups[group_index];
        if group.rack_ids.len() <= 1 {
            return Some(Self::Dissolved { group_index, group: group.clone() });
        }
        let index = group.rack_ids.iter().position(|id| id == rack_id)?;
        Some(Self::Removed { group_id: group.id.clone(), index })
    }

    fn apply(&self, layout: &mut Layout, rack_id: &str) {
        match self {
            Self::Removed { group_id, .. } => layout.remove_rack_from_group_raw(group_id, rack_id),
            Self::Dissolved { group, .. } => {
                layout.delete_rack_group_raw(&group.id);
            }
        }
    }

    fn revert(&self, layout: &mut Layout, rack_id: &str) {
        match self {
            Self::Removed { group_id, index } => layout.insert_rack_into_group_raw(group_id, *index, rack_id),
            Self::Dissolved { group_index, group } => layout.create_rack_group_raw(*group_index, group.clone()),
        }
    }
}

/// The state change carried by a command, with everything needed to undo it.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOp {
    PlaceDevice { rack_id: EntityId, index: usize, device: PlacedDevice },
    RemoveDevice { rack_id: EntityId, index: usize, device: PlacedDevice },
    MoveDevice { rack_id: EntityId, device_id: EntityId, from: InternalUnit, to: InternalUnit },
    /// Any non-positional edit of a placement: face, name, notes, IP, colour, image.
    UpdateDevice { rack_id: EntityId, before: PlacedDevice, after: PlacedDevice },
    AddRack { index: usize, rack: Rack },
    DeleteRack { index: usize, rack: Rack, departure: Option<GroupDeparture> },
    UpdateRack { rack_id: EntityId, before: RackProperties, after: RackProperties },
    ReplaceRack { before: Rack, after: Rack },
    AddDeviceType { index: usize, device_type: DeviceType },
    UpdateDeviceType { before: DeviceType, after: DeviceType },
    DeleteDeviceType { index: usize, device_type: DeviceType },
    CreateRackGroup { index: usize, group: RackGroup },
    UpdateRackGroup { before: RackGroup, after: RackGroup },
    DeleteRackGroup { index: usize, group: RackGroup },
    AddRackToGroup { group_id: EntityId, rack_id: EntityId, index: usize },
    RemoveRackFromGroup { rack_id: EntityId, departure: GroupDeparture },
    RenameLayout { before: String, after: String },
    /// Applied in order, reverted in reverse order.
    Batch(Vec<CommandOp>),
}

impl CommandOp {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::PlaceDevice { .. } => CommandKind::AddDevice,
            Self::RemoveDevice { .. } => CommandKind::RemoveDevice,
            Self::MoveDevice { .. } => CommandKind::MoveDevice,
            Self::UpdateDevice { .. } => CommandKind::UpdateDevice,
            Self::AddRack { .. } => CommandKind::AddRack,
            Self::DeleteRack { .. } => CommandKind::DeleteRack,
            Self::UpdateRack { .. } => CommandKind::UpdateRack,
            Self::ReplaceRack { .. } => CommandKind::ReplaceRack,
            Self::AddDeviceType { .. } => CommandKind::AddDeviceType,
            Self::UpdateDeviceType { .. } => CommandKind::UpdateDeviceType,
            Self::DeleteDeviceType { .. } => CommandKind::DeleteDeviceType,
            Self::CreateRackGroup { .. } => CommandKind::CreateRackGroup,
            Self::UpdateRackGroup { .. } => CommandKind::UpdateRackGroup,
            Self::DeleteRackGroup { .. } => CommandKind::DeleteRackGroup,
            Self::AddRackToGroup { .. } => CommandKind::AddRackToGroup,
            Self::RemoveRackFromGroup { .. } => CommandKind::RemoveRackFromGroup,
            Self::RenameLayout { .. } => CommandKind::RenameLayout,
            Self::Batch(_) => CommandKind::Batch,
        }
    }

    pub(crate) fn apply(&self, layout: &mut Layout) {
        match self {
            Self::PlaceDevice { rack_id, index, device } => layout.place_device_raw(rack_id, *index, device.clone()),
            Self::RemoveDevice { rack_id, index, .. } => {
                layout.remove_device_at_index_raw(rack_id, *index);
            }
            Self::MoveDevice { rack_id, device_id, to, .. } => layout.move_device_raw(rack_id, device_id, *to),
            Self::UpdateDevice { rack_id, after, .. } => layout.replace_device_raw(rack_id, after.clone()),
            Self::AddRack { index, rack } => layout.add_rack_raw(*index, rack.clone()),
            Self::DeleteRack { rack, departure, .. } => {
                if let Some(departure) = departure {
                    departure.apply(layout, &rack.id);
                }
                layout.delete_rack_raw(&rack.id);
            }
            Self::UpdateRack { rack_id, after, .. } => layout.update_rack_raw(rack_id, after.clone()),
            Self::ReplaceRack { before, after } => layout.replace_rack_raw(&before.id, after.clone()),
            Self::AddDeviceType { index, device_type } => layout.add_device_type_raw(*index, device_type.clone()),
            Self::UpdateDeviceType { after, .. } => layout.update_device_type_raw(after.clone()),
            Self::DeleteDeviceType { device_type, .. } => {
                layout.delete_device_type_raw(&device_type.slug);
            }
            Self::CreateRackGroup { index, group } => layout.create_rack_group_raw(*index, group.clone()),
            Self::UpdateRackGroup { after, .. } => layout.update_rack_group_raw(after.clone()),
            Self::DeleteRackGroup { group, .. } => {
                layout.delete_rack_group_raw(&group.id);
            }
            Self::AddRackToGroup { group_id, rack_id, index } => {
                layout.insert_rack_into_group_raw(group_id, *index, rack_id);
            }
            Self::RemoveRackFromGroup { rack_id, departure } => departure.apply(layout, rack_id),
            Self::RenameLayout { after, .. } => layout.set_layout_name_raw(after.clone()),
            Self::Batch(ops) => {
                for op in ops {
                    op.apply(layout);
                }
            }
        }
    }

    pub(crate) fn revert(&self, layout: &mut Layout) {
        match self {
            Self::PlaceDevice { rack_id, index, .. } => {
                layout.remove_device_at_index_raw(rack_id, *index);
            }
            Self::RemoveDevice { rack_id, index, device } => layout.place_device_raw(rack_id, *index, device.clone()),
            Self::MoveDevice { rack_id, device_id, from, .. } => layout.move_device_raw(rack_id, device_id, *from),
            Self::UpdateDevice { rack_id, before, .. } => layout.replace_device_raw(rack_id, before.clone()),
            Self::AddRack { rack, .. } => {
                layout.delete_rack_raw(&rack.id);
            }
            Self::DeleteRack { index, rack, departure } => {
                layout.add_rack_raw(*index, rack.clone());
                if let Some(departure) = departure {
                    departure.revert(layout, &rack.id);
                }
            }
            Self::UpdateRack { rack_id, before, .. } => layout.update_rack_raw(rack_id, before.clone()),
            Self::ReplaceRack { before, after } => layout.replace_rack_raw(&after.id, before.clone()),
            Self::AddDeviceType { device_type, .. } => {
                layout.delete_device_type_raw(&device_type.slug);
            }
            Self::UpdateDeviceType { before, .. } => layout.update_device_type_raw(before.clone()),
            Self::DeleteDeviceType { index, device_type } => layout.add_device_type_raw(*index, device_type.clone()),
            Self::CreateRackGroup { group, .. } => {
                layout.delete_rack_group_raw(&group.id);
            }
            Self::UpdateRackGroup { before, .. } => layout.update_rack_group_raw(before.clone()),
            Self::DeleteRackGroup { index, group } => layout.create_rack_group_raw(*index, group.clone()),
            Self::AddRackToGroup { group_id, rack_id, .. } => layout.remove_rack_from_group_raw(group_id, rack_id),
            Self::RemoveRackFromGroup { rack_id, departure } => departure.revert(layout, rack_id),
            Self::RenameLayout { before, .. } => layout.set_layout_name_raw(before.clone()),
            Self::Batch(ops) => {
                for op in ops.iter().rev() {
                    op.revert(layout);
                }
            }
        }
    }
}

/// A recorded, reversible layout mutation.
#[derive(Debug, Clone)]
pub struct Command {
    op: CommandOp,
    description: String,
    timestamp_ms: i64,
}

impl Command {
    #[must_use]
    pub fn new(op: CommandOp, description: impl Into<String>) -> Self {
        Self { op, description: description.into(), timestamp_ms: now_ms() }
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.op.kind()
    }

    /// Human-readable label, e.g. `"Move 1U Server"`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    #[must_use]
    pub fn op(&self) -> &CommandOp {
        &self.op
    }

    pub(crate) fn execute(&self, layout: &mut Layout) {
        self.op.apply(layout);
    }

    pub(crate) fn undo(&self, layout: &mut Layout) {
        self.op.revert(layout);
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
