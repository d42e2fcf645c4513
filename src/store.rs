//! The editor session: canonical layout state plus the recorded action façade.
//!
//! DESIGN
//! ======
//! `LayoutStore` is the only way code outside the crate mutates a layout.
//! Every recorded action is split in two:
//!
//! 1. a `plan_*` method that reads the layout, validates through the collision
//!    engine, and builds a [`CommandOp`] holding cloned snapshots;
//! 2. `commit`, which pushes the op through [`History`] (which
//!    applies it via raw mutators) or logs and returns the rejection.
//!
//! A rejected action never touches the layout, the history, or the dirty flag.
//!
//! Observers
//! ---------
//! Callers either poll the getters or `subscribe` a listener that receives a
//! [`Change`] after each state transition. Listeners run synchronously inside
//! the mutating call.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use crate::catalog::{DeviceTypeLookup, is_starter_slug};
use crate::collision::{self, PlacementError};
use crate::command::{Command, CommandOp, GroupDeparture};
use crate::config::EditorConfig;
use crate::consts::{MAX_DEVICE_HEIGHT_U, MAX_RACK_HEIGHT, MIN_DEVICE_HEIGHT};
use crate::error::ErrorCode;
use crate::history::{History, Replayed};
use crate::identity;
use crate::layout::{
    DeviceDetails, DeviceType, EntityId, Face, GroupLayout, Layout, LayoutSettings, Rack, RackGroup,
    RackProperties,
};
use crate::placement::{PendingPlacement, PlacementMode};
use crate::units::{InternalUnit, height_to_internal};

const UNTITLED_LAYOUT: &str = "Untitled Layout";

// =============================================================================
// Errors
// =============================================================================

/// Why a store action was rejected. Rejections leave the session untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("rack not found: {0}")]
    RackNotFound(EntityId),
    #[error("device not found: {0}")]
    DeviceNotFound(EntityId),
    #[error("rack group not found: {0}")]
    GroupNotFound(EntityId),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("device type {slug} still has {count} placement(s)")]
    DeviceTypeInUse { slug: String, count: usize },
    #[error("device type {0} is part of the starter library and cannot be changed")]
    ReadOnlyDeviceType(String),
    #[error("device type slug already exists: {0}")]
    DuplicateSlug(String),
    #[error("invalid device height: {0}U")]
    InvalidDeviceHeight(f64),
    #[error("invalid rack height: {0}U (expected 1..=100)")]
    InvalidRackHeight(u32),
    #[error("rack {rack_id} already belongs to group {group_id}")]
    RackAlreadyGrouped { rack_id: EntityId, group_id: EntityId },
    #[error("rack {0} is not in a group")]
    RackNotGrouped(EntityId),
    #[error("a rack group needs at least one rack")]
    EmptyGroup,
    #[error("no device is waiting to be placed")]
    NoPendingPlacement,
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RackNotFound(_) => "E_RACK_NOT_FOUND",
            Self::DeviceNotFound(_) => "E_DEVICE_NOT_FOUND",
            Self::GroupNotFound(_) => "E_GROUP_NOT_FOUND",
            Self::Placement(inner) => inner.error_code(),
            Self::DeviceTypeInUse { .. } => "E_DEVICE_TYPE_IN_USE",
            Self::ReadOnlyDeviceType(_) => "E_READ_ONLY_DEVICE_TYPE",
            Self::DuplicateSlug(_) => "E_DUPLICATE_SLUG",
            Self::InvalidDeviceHeight(_) => "E_INVALID_DEVICE_HEIGHT",
            Self::InvalidRackHeight(_) => "E_INVALID_RACK_HEIGHT",
            Self::RackAlreadyGrouped { .. } => "E_RACK_ALREADY_GROUPED",
            Self::RackNotGrouped(_) => "E_RACK_NOT_GROUPED",
            Self::EmptyGroup => "E_EMPTY_GROUP",
            Self::NoPendingPlacement => "E_NO_PENDING_PLACEMENT",
        }
    }
}

// =============================================================================
// Observers
// =============================================================================

/// What changed, delivered to subscribed listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Layout content changed through an action, undo, redo, or settings edit.
    Layout,
    /// The active rack changed.
    ActiveRack,
    /// Placement mode started, retargeted, or ended.
    Placement,
    /// Undo and redo stacks were cleared.
    History,
    /// The session was marked clean (saved).
    Clean,
    /// A different layout was loaded, created, or the store was reset.
    Session,
}

/// Handle returned by [`LayoutStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Change)>;

/// A validated command waiting to be committed, plus what the action returns.
struct Planned<T> {
    op: CommandOp,
    description: String,
    output: T,
}

impl Planned<()> {
    fn new(op: CommandOp, description: String) -> Self {
        Self { op, description, output: () }
    }
}

// =============================================================================
// Store
// =============================================================================

pub struct LayoutStore {
    layout: Layout,
    history: History,
    active_rack_id: Option<EntityId>,
    dirty: bool,
    placement: PlacementMode,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore")
            .field("layout_id", &self.layout.id)
            .field("racks", &self.layout.racks.len())
            .field("history", &self.history)
            .field("active_rack_id", &self.active_rack_id)
            .field("dirty", &self.dirty)
            .field("placement", &self.placement.is_placing())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            layout: Layout::new(UNTITLED_LAYOUT),
            history: History::new(config.history),
            active_rack_id: None,
            dirty: false,
            placement: PlacementMode::Idle,
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Replace the live layout with a loaded one. The id is normalized, history
    /// is forgotten, and the session starts clean.
    pub fn load_layout(&mut self, mut layout: Layout) {
        let external = (!layout.id.is_empty()).then_some(layout.id.as_str());
        layout.id = identity::resolve_layout_id(external);
        for dangling in layout.dangling_placements() {
            tracing::warn!(
                rack_id = %dangling.rack_id,
                device_id = %dangling.device_id,
                device_type = %dangling.device_type,
                "placement references unknown device type"
            );
        }
        tracing::info!(layout_id = %layout.id, racks = layout.racks.len(), "layout loaded");
        self.replace_session(layout);
    }

    /// Start a fresh, empty layout.
    pub fn new_layout(&mut self, name: impl Into<String>) {
        let layout = Layout::new(name);
        tracing::info!(layout_id = %layout.id, "new layout");
        self.replace_session(layout);
    }

    /// Return to the initial empty state. Config and listeners are kept.
    pub fn reset(&mut self) {
        tracing::info!("store reset");
        self.replace_session(Layout::new(UNTITLED_LAYOUT));
    }

    fn replace_session(&mut self, layout: Layout) {
        self.active_rack_id = layout.racks.first().map(|r| r.id.clone());
        self.layout = layout;
        self.history.clear();
        self.placement = PlacementMode::Idle;
        self.dirty = false;
        self.notify(Change::Session);
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn racks(&self) -> &[Rack] {
        &self.layout.racks
    }

    #[must_use]
    pub fn rack(&self, rack_id: &str) -> Option<&Rack> {
        self.layout.get_rack_by_id(rack_id)
    }

    #[must_use]
    pub fn active_rack(&self) -> Option<&Rack> {
        self.active_rack_id.as_deref().and_then(|id| self.layout.get_rack_by_id(id))
    }

    #[must_use]
    pub fn active_rack_id(&self) -> Option<&str> {
        self.active_rack_id.as_deref()
    }

    /// Select the rack the UI is focused on.
    ///
    /// # Errors
    ///
    /// `RackNotFound` if `rack_id` is not in the layout.
    pub fn set_active_rack(&mut self, rack_id: &str) -> Result<(), StoreError> {
        self.find_rack(rack_id)?;
        self.select_rack(Some(rack_id.to_string()));
        Ok(())
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the current state has been saved.
    pub fn mark_clean(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.notify(Change::Clean);
        }
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Resolve a device type from the layout's custom types or the starter library.
    #[must_use]
    pub fn device_type(&self, slug: &str) -> Option<&DeviceType> {
        self.layout.device_type(slug)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Change) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: Change) {
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    /// Revert the most recent action. `None` (and no change) when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Replayed> {
        let replayed = self.history.undo(&mut self.layout)?;
        self.after_layout_change();
        Some(replayed)
    }

    /// Re-apply the most recently undone action. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Replayed> {
        let replayed = self.history.redo(&mut self.layout)?;
        self.after_layout_change();
        Some(replayed)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.history.next_undo_description()
    }

    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.history.next_redo_description()
    }

    /// Forget undo and redo without changing the layout.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.notify(Change::History);
    }

    fn commit<T>(&mut self, action: &'static str, planned: Result<Planned<T>, StoreError>) -> Result<T, StoreError> {
        match planned {
            Ok(planned) => {
                self.record(planned.op, planned.description);
                Ok(planned.output)
            }
            Err(err) => {
                tracing::warn!(action, code = err.error_code(), error = %err, "action rejected");
                Err(err)
            }
        }
    }

    fn record(&mut self, op: CommandOp, description: String) {
        self.history.execute(Command::new(op, description), &mut self.layout);
        self.after_layout_change();
    }

    fn after_layout_change(&mut self) {
        self.dirty = true;
        self.notify(Change::Layout);
        self.reconcile_active_rack();
    }

    /// Keep the active rack pointing at a rack that exists.
    fn reconcile_active_rack(&mut self) {
        let still_present = self
            .active_rack_id
            .as_deref()
            .is_some_and(|id| self.layout.get_rack_by_id(id).is_some());
        if !still_present {
            let fallback = self.layout.racks.first().map(|r| r.id.clone());
            self.select_rack(fallback);
        }
    }

    fn select_rack(&mut self, rack_id: Option<EntityId>) {
        if self.active_rack_id != rack_id {
            self.active_rack_id = rack_id;
            self.notify(Change::ActiveRack);
        }
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    fn find_rack(&self, rack_id: &str) -> Result<&Rack, StoreError> {
        self.layout
            .get_rack_by_id(rack_id)
            .ok_or_else(|| StoreError::RackNotFound(rack_id.to_string()))
    }

    fn find_group(&self, group_id: &str) -> Result<&RackGroup, StoreError> {
        self.layout
            .get_rack_group(group_id)
            .ok_or_else(|| StoreError::GroupNotFound(group_id.to_string()))
    }

    fn type_label(&self, slug: &str) -> String {
        self.layout
            .device_type(slug)
            .map_or_else(|| slug.to_string(), DeviceType::display_name)
    }

    // -------------------------------------------------------------------------
    // Devices
    // -------------------------------------------------------------------------

    /// Place a new device of `slug` at `position` on `face`. Returns the new device id.
    ///
    /// # Errors
    ///
    /// `RackNotFound`, or a `Placement` rejection.
    pub fn place_device_recorded(
        &mut self,
        rack_id: &str,
        slug: &str,
        position: InternalUnit,
        face: Face,
    ) -> Result<EntityId, StoreError> {
        let planned = self.plan_place(rack_id, slug, position, face);
        self.commit("place_device", planned)
    }

    fn plan_place(
        &self,
        rack_id: &str,
        slug: &str,
        position: InternalUnit,
        face: Face,
    ) -> Result<Planned<EntityId>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let device = collision::plan_placement(rack, &self.layout, slug, position, face)?;
        let output = device.id.clone();
        let op = CommandOp::PlaceDevice { rack_id: rack.id.clone(), index: rack.devices.len(), device };
        Ok(Planned { op, description: format!("Place {}", self.type_label(slug)), output })
    }

    /// Move a placed device to `position` within its rack.
    ///
    /// # Errors
    ///
    /// `RackNotFound`, `DeviceNotFound`, or a `Placement` rejection.
    pub fn move_device_recorded(
        &mut self,
        rack_id: &str,
        device_id: &str,
        position: InternalUnit,
    ) -> Result<(), StoreError> {
        let planned = self.plan_move(rack_id, device_id, position);
        self.commit("move_device", planned)
    }

    fn plan_move(&self, rack_id: &str, device_id: &str, position: InternalUnit) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let device = rack.device(device_id).ok_or_else(|| StoreError::DeviceNotFound(device_id.to_string()))?;
        collision::validate_move(rack, &self.layout, device, position)?;
        let op = CommandOp::MoveDevice {
            rack_id: rack.id.clone(),
            device_id: device.id.clone(),
            from: device.position,
            to: position,
        };
        Ok(Planned::new(op, format!("Move {}", self.type_label(&device.device_type))))
    }

    /// Remove a placed device.
    ///
    /// # Errors
    ///
    /// `RackNotFound` or `DeviceNotFound`.
    pub fn remove_device_recorded(&mut self, rack_id: &str, device_id: &str) -> Result<(), StoreError> {
        let planned = self.plan_remove(rack_id, device_id);
        self.commit("remove_device", planned)
    }

    fn plan_remove(&self, rack_id: &str, device_id: &str) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let index = rack
            .device_index(device_id)
            .ok_or_else(|| StoreError::DeviceNotFound(device_id.to_string()))?;
        let device = rack.devices[index].clone();
        let description = format!("Remove {}", self.type_label(&device.device_type));
        Ok(Planned::new(CommandOp::RemoveDevice { rack_id: rack.id.clone(), index, device }, description))
    }

    /// Flip a placed device to `face` at its current position.
    ///
    /// # Errors
    ///
    /// `RackNotFound`, `DeviceNotFound`, or a `Placement` rejection.
    pub fn set_device_face_recorded(&mut self, rack_id: &str, device_id: &str, face: Face) -> Result<(), StoreError> {
        let planned = self.plan_face(rack_id, device_id, face);
        self.commit("set_device_face", planned)
    }

    fn plan_face(&self, rack_id: &str, device_id: &str, face: Face) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let before = rack.device(device_id).ok_or_else(|| StoreError::DeviceNotFound(device_id.to_string()))?;
        collision::validate_face_change(rack, &self.layout, before, face)?;
        let mut after = before.clone();
        after.face = face;
        let description = format!("Flip {} to {}", self.type_label(&before.device_type), face.as_str());
        let op = CommandOp::UpdateDevice { rack_id: rack.id.clone(), before: before.clone(), after };
        Ok(Planned::new(op, description))
    }

    /// Rename, annotate, recolour, or change the image of a placed device.
    ///
    /// # Errors
    ///
    /// `RackNotFound` or `DeviceNotFound`.
    pub fn update_device_details_recorded(
        &mut self,
        rack_id: &str,
        device_id: &str,
        details: DeviceDetails,
    ) -> Result<(), StoreError> {
        let planned = self.plan_details(rack_id, device_id, details);
        self.commit("update_device_details", planned)
    }

    fn plan_details(&self, rack_id: &str, device_id: &str, details: DeviceDetails) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let before = rack.device(device_id).ok_or_else(|| StoreError::DeviceNotFound(device_id.to_string()))?;
        let mut after = before.clone();
        after.set_details(details);
        let description = format!("Edit {}", self.type_label(&before.device_type));
        let op = CommandOp::UpdateDevice { rack_id: rack.id.clone(), before: before.clone(), after };
        Ok(Planned::new(op, description))
    }

    /// Remove every device from a rack as one undoable step. Returns how many
    /// were removed; an empty rack records nothing.
    ///
    /// # Errors
    ///
    /// `RackNotFound`.
    pub fn clear_rack(&mut self, rack_id: &str) -> Result<usize, StoreError> {
        let planned = self.plan_clear(rack_id);
        if matches!(&planned, Ok(p) if p.output == 0) {
            return Ok(0);
        }
        self.commit("clear_rack", planned)
    }

    fn plan_clear(&self, rack_id: &str) -> Result<Planned<usize>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        // Highest index first so each removal leaves the remaining indices valid.
        let ops = rack
            .devices
            .iter()
            .enumerate()
            .rev()
            .map(|(index, device)| CommandOp::RemoveDevice { rack_id: rack.id.clone(), index, device: device.clone() })
            .collect();
        Ok(Planned {
            op: CommandOp::Batch(ops),
            description: format!("Clear {}", rack.name),
            output: rack.devices.len(),
        })
    }

    // -------------------------------------------------------------------------
    // Racks
    // -------------------------------------------------------------------------

    /// Append an empty rack and make it active. Returns the new rack id.
    ///
    /// # Errors
    ///
    /// `InvalidRackHeight` if `height` is outside `1..=100`.
    pub fn add_rack(&mut self, name: impl Into<String>, height: u32) -> Result<EntityId, StoreError> {
        let planned = self.plan_add_rack(name.into(), height);
        let rack_id = self.commit("add_rack", planned)?;
        self.select_rack(Some(rack_id.clone()));
        Ok(rack_id)
    }

    /// Append an empty rack at the configured default height.
    ///
    /// # Errors
    ///
    /// Same as [`LayoutStore::add_rack`].
    pub fn add_default_rack(&mut self, name: impl Into<String>) -> Result<EntityId, StoreError> {
        self.add_rack(name, self.config.default_rack_height)
    }

    fn plan_add_rack(&self, name: String, height: u32) -> Result<Planned<EntityId>, StoreError> {
        check_rack_height(height)?;
        let mut rack = Rack::new(name, height);
        rack.width = self.config.default_rack_width;
        let output = rack.id.clone();
        let description = format!("Add rack {}", rack.name);
        Ok(Planned { op: CommandOp::AddRack { index: self.layout.racks.len(), rack }, description, output })
    }

    /// Copy a rack (fresh rack and device ids) right after the original and make it active.
    ///
    /// # Errors
    ///
    /// `RackNotFound`.
    pub fn duplicate_rack(&mut self, rack_id: &str) -> Result<EntityId, StoreError> {
        let planned = self.plan_duplicate(rack_id);
        let copy_id = self.commit("duplicate_rack", planned)?;
        self.select_rack(Some(copy_id.clone()));
        Ok(copy_id)
    }

    fn plan_duplicate(&self, rack_id: &str) -> Result<Planned<EntityId>, StoreError> {
        let source = self.find_rack(rack_id)?;
        let index = self.layout.rack_index(rack_id).map_or(self.layout.racks.len(), |i| i + 1);
        let mut copy = source.clone();
        copy.id = identity::new_id();
        copy.name = format!("{} (copy)", source.name);
        for device in &mut copy.devices {
            device.id = identity::new_id();
        }
        let output = copy.id.clone();
        let description = format!("Duplicate rack {}", source.name);
        Ok(Planned { op: CommandOp::AddRack { index, rack: copy }, description, output })
    }

    /// Change a rack's name, height, width, form factor, or numbering.
    ///
    /// # Errors
    ///
    /// `RackNotFound`, `InvalidRackHeight`, or `Placement(OutOfBounds)` when
    /// shrinking would cut off a device.
    pub fn update_rack(&mut self, rack_id: &str, props: RackProperties) -> Result<(), StoreError> {
        let planned = self.plan_update_rack(rack_id, props);
        self.commit("update_rack", planned)
    }

    fn plan_update_rack(&self, rack_id: &str, after: RackProperties) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        check_rack_height(after.height)?;
        if after.height < rack.height {
            collision::validate_rack_height(rack, &self.layout, after.height)?;
        }
        let description = format!("Update rack {}", after.name);
        let op = CommandOp::UpdateRack { rack_id: rack.id.clone(), before: rack.properties(), after };
        Ok(Planned::new(op, description))
    }

    /// Swap a rack's whole content (e.g. from an import) while keeping its id,
    /// so group membership and selection survive.
    ///
    /// # Errors
    ///
    /// `RackNotFound`, `InvalidRackHeight`, or `Placement` if a device in the
    /// replacement has an unknown type, sits off the hole grid, sticks out, or
    /// overlaps another device of the replacement.
    pub fn replace_rack(&mut self, rack_id: &str, replacement: Rack) -> Result<(), StoreError> {
        let planned = self.plan_replace_rack(rack_id, replacement);
        self.commit("replace_rack", planned)
    }

    fn plan_replace_rack(&self, rack_id: &str, mut after: Rack) -> Result<Planned<()>, StoreError> {
        let before = self.find_rack(rack_id)?;
        check_rack_height(after.height)?;
        collision::validate_rack_contents(&after, &self.layout)?;
        after.id = before.id.clone();
        let description = format!("Replace rack {}", before.name);
        Ok(Planned::new(CommandOp::ReplaceRack { before: before.clone(), after }, description))
    }

    /// Delete a rack with all its devices. Leaves its group, deleting the group
    /// if the rack was the last member.
    ///
    /// # Errors
    ///
    /// `RackNotFound`.
    pub fn delete_rack(&mut self, rack_id: &str) -> Result<(), StoreError> {
        let planned = self.plan_delete_rack(rack_id);
        self.commit("delete_rack", planned)
    }

    fn plan_delete_rack(&self, rack_id: &str) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let index = self.layout.rack_index(rack_id).unwrap_or(self.layout.racks.len());
        let departure = GroupDeparture::for_rack(&self.layout, rack_id);
        let description = format!("Delete rack {}", rack.name);
        Ok(Planned::new(CommandOp::DeleteRack { index, rack: rack.clone(), departure }, description))
    }

    // -------------------------------------------------------------------------
    // Device types
    // -------------------------------------------------------------------------

    /// Add a custom device type. An empty slug is generated from manufacturer
    /// and model. Returns the stored slug.
    ///
    /// # Errors
    ///
    /// `DuplicateSlug` or `InvalidDeviceHeight`.
    pub fn add_device_type(&mut self, device_type: DeviceType) -> Result<String, StoreError> {
        let planned = self.plan_add_type(device_type);
        self.commit("add_device_type", planned)
    }

    fn plan_add_type(&self, mut device_type: DeviceType) -> Result<Planned<String>, StoreError> {
        check_device_height(device_type.u_height)?;
        if device_type.slug.is_empty() {
            let source = [device_type.manufacturer.as_deref(), device_type.model.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            device_type.slug =
                identity::unique_slug(&identity::slugify(&source), |s| self.layout.device_type(s).is_some());
        } else if self.layout.device_type(&device_type.slug).is_some() {
            return Err(StoreError::DuplicateSlug(device_type.slug));
        }
        let output = device_type.slug.clone();
        let description = format!("Add device type {}", device_type.display_name());
        let op = CommandOp::AddDeviceType { index: self.layout.device_types.len(), device_type };
        Ok(Planned { op, description, output })
    }

    /// Replace a custom device type, matched by slug. Every existing placement
    /// must still fit at the new height and depth.
    ///
    /// # Errors
    ///
    /// `ReadOnlyDeviceType`, `Placement(UnknownDeviceType)`, `InvalidDeviceHeight`,
    /// or a `Placement` rejection for a placement that would no longer fit.
    pub fn update_device_type(&mut self, device_type: DeviceType) -> Result<(), StoreError> {
        let planned = self.plan_update_type(device_type);
        self.commit("update_device_type", planned)
    }

    fn plan_update_type(&self, after: DeviceType) -> Result<Planned<()>, StoreError> {
        let before = self.find_custom_type(&after.slug)?;
        check_device_height(after.u_height)?;
        collision::validate_type_resize(&self.layout, &after)?;
        let description = format!("Update device type {}", after.display_name());
        Ok(Planned::new(CommandOp::UpdateDeviceType { before: before.clone(), after }, description))
    }

    /// Delete a custom device type. Blocked while any placement references it.
    ///
    /// # Errors
    ///
    /// `ReadOnlyDeviceType`, `Placement(UnknownDeviceType)`, or `DeviceTypeInUse`.
    pub fn delete_device_type(&mut self, slug: &str) -> Result<(), StoreError> {
        let planned = self.plan_delete_type(slug);
        self.commit("delete_device_type", planned)
    }

    fn plan_delete_type(&self, slug: &str) -> Result<Planned<()>, StoreError> {
        let device_type = self.find_custom_type(slug)?;
        let count = self.layout.get_placed_devices_for_type(slug).len();
        if count > 0 {
            return Err(StoreError::DeviceTypeInUse { slug: slug.to_string(), count });
        }
        let index = self.layout.custom_device_type_index(slug).unwrap_or(self.layout.device_types.len());
        let description = format!("Delete device type {}", device_type.display_name());
        Ok(Planned::new(CommandOp::DeleteDeviceType { index, device_type: device_type.clone() }, description))
    }

    fn find_custom_type(&self, slug: &str) -> Result<&DeviceType, StoreError> {
        if let Some(device_type) = self.layout.custom_device_type(slug) {
            return Ok(device_type);
        }
        if is_starter_slug(slug) {
            return Err(StoreError::ReadOnlyDeviceType(slug.to_string()));
        }
        Err(PlacementError::UnknownDeviceType(slug.to_string()).into())
    }

    // -------------------------------------------------------------------------
    // Groups
    // -------------------------------------------------------------------------

    /// Group existing, ungrouped racks in the given order. Returns the group id.
    ///
    /// # Errors
    ///
    /// `EmptyGroup`, `RackNotFound`, or `RackAlreadyGrouped`.
    pub fn create_rack_group(
        &mut self,
        name: impl Into<String>,
        rack_ids: &[&str],
        layout: GroupLayout,
    ) -> Result<EntityId, StoreError> {
        let planned = self.plan_create_group(name.into(), rack_ids, layout);
        self.commit("create_rack_group", planned)
    }

    fn plan_create_group(
        &self,
        name: String,
        rack_ids: &[&str],
        layout: GroupLayout,
    ) -> Result<Planned<EntityId>, StoreError> {
        let mut members: Vec<EntityId> = Vec::with_capacity(rack_ids.len());
        for &rack_id in rack_ids {
            self.check_groupable(rack_id)?;
            if !members.iter().any(|m| m == rack_id) {
                members.push(rack_id.to_string());
            }
        }
        if members.is_empty() {
            return Err(StoreError::EmptyGroup);
        }
        let group = RackGroup { id: identity::new_id(), name, rack_ids: members, layout };
        let output = group.id.clone();
        let description = format!("Create group {}", group.name);
        Ok(Planned { op: CommandOp::CreateRackGroup { index: self.layout.rack_groups.len(), group }, description, output })
    }

    /// Rename a group or change its arrangement. Membership is unchanged.
    ///
    /// # Errors
    ///
    /// `GroupNotFound`.
    pub fn update_rack_group(
        &mut self,
        group_id: &str,
        name: impl Into<String>,
        layout: GroupLayout,
    ) -> Result<(), StoreError> {
        let planned = self.plan_update_group(group_id, name.into(), layout);
        self.commit("update_rack_group", planned)
    }

    fn plan_update_group(&self, group_id: &str, name: String, layout: GroupLayout) -> Result<Planned<()>, StoreError> {
        let before = self.find_group(group_id)?;
        let after = RackGroup { name, layout, ..before.clone() };
        let description = format!("Update group {}", after.name);
        Ok(Planned::new(CommandOp::UpdateRackGroup { before: before.clone(), after }, description))
    }

    /// Delete a group. Its racks stay in the layout, ungrouped.
    ///
    /// # Errors
    ///
    /// `GroupNotFound`.
    pub fn delete_rack_group(&mut self, group_id: &str) -> Result<(), StoreError> {
        let planned = self.plan_delete_group(group_id);
        self.commit("delete_rack_group", planned)
    }

    fn plan_delete_group(&self, group_id: &str) -> Result<Planned<()>, StoreError> {
        let group = self.find_group(group_id)?;
        let index = self.layout.rack_group_index(group_id).unwrap_or(self.layout.rack_groups.len());
        let description = format!("Delete group {}", group.name);
        Ok(Planned::new(CommandOp::DeleteRackGroup { index, group: group.clone() }, description))
    }

    /// Append an ungrouped rack to a group.
    ///
    /// # Errors
    ///
    /// `GroupNotFound`, `RackNotFound`, or `RackAlreadyGrouped`.
    pub fn add_rack_to_group(&mut self, group_id: &str, rack_id: &str) -> Result<(), StoreError> {
        let planned = self.plan_join_group(group_id, rack_id);
        self.commit("add_rack_to_group", planned)
    }

    fn plan_join_group(&self, group_id: &str, rack_id: &str) -> Result<Planned<()>, StoreError> {
        let group = self.find_group(group_id)?;
        let rack = self.check_groupable(rack_id)?;
        let description = format!("Add {} to {}", rack.name, group.name);
        let op = CommandOp::AddRackToGroup {
            group_id: group.id.clone(),
            rack_id: rack.id.clone(),
            index: group.rack_ids.len(),
        };
        Ok(Planned::new(op, description))
    }

    /// Take a rack out of its group. Removing the last member deletes the group.
    ///
    /// # Errors
    ///
    /// `RackNotFound` or `RackNotGrouped`.
    pub fn remove_rack_from_group(&mut self, rack_id: &str) -> Result<(), StoreError> {
        let planned = self.plan_leave_group(rack_id);
        self.commit("remove_rack_from_group", planned)
    }

    fn plan_leave_group(&self, rack_id: &str) -> Result<Planned<()>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        let departure = GroupDeparture::for_rack(&self.layout, rack_id)
            .ok_or_else(|| StoreError::RackNotGrouped(rack_id.to_string()))?;
        let description = format!("Remove {} from group", rack.name);
        Ok(Planned::new(CommandOp::RemoveRackFromGroup { rack_id: rack.id.clone(), departure }, description))
    }

    fn check_groupable(&self, rack_id: &str) -> Result<&Rack, StoreError> {
        let rack = self.find_rack(rack_id)?;
        if let Some(group) = self.layout.get_rack_group_for_rack(rack_id) {
            return Err(StoreError::RackAlreadyGrouped { rack_id: rack_id.to_string(), group_id: group.id.clone() });
        }
        Ok(rack)
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// Rename the layout as an undoable step. Renaming to the current name is a no-op.
    pub fn rename_layout(&mut self, name: impl Into<String>) {
        let after = name.into();
        if after == self.layout.name {
            return;
        }
        let description = format!("Rename layout to {after}");
        let op = CommandOp::RenameLayout { before: self.layout.name.clone(), after };
        self.record(op, description);
    }

    /// Replace display settings. Marks the session dirty but is not undoable.
    pub fn update_settings(&mut self, settings: LayoutSettings) {
        if self.layout.settings == settings {
            return;
        }
        self.layout.settings = settings;
        self.dirty = true;
        self.notify(Change::Layout);
    }

    // -------------------------------------------------------------------------
    // Placement mode
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn placement_mode(&self) -> &PlacementMode {
        &self.placement
    }

    /// Pick up a device type for tap-to-place, targeting the configured default face.
    ///
    /// # Errors
    ///
    /// `Placement(UnknownDeviceType)` if `slug` does not resolve.
    pub fn start_placement(&mut self, slug: &str) -> Result<(), StoreError> {
        self.start_placement_on(slug, self.config.default_face)
    }

    /// Pick up a device type for tap-to-place, targeting `face`.
    ///
    /// # Errors
    ///
    /// `Placement(UnknownDeviceType)` if `slug` does not resolve.
    pub fn start_placement_on(&mut self, slug: &str, face: Face) -> Result<(), StoreError> {
        let Some(device_type) = self.layout.device_type(slug).cloned() else {
            let err = StoreError::from(PlacementError::UnknownDeviceType(slug.to_string()));
            tracing::warn!(action = "start_placement", code = err.error_code(), error = %err, "action rejected");
            return Err(err);
        };
        self.placement.start_placement_on(device_type, face);
        self.notify(Change::Placement);
        Ok(())
    }

    /// Retarget the pending device. `false` when not placing.
    pub fn set_target_face(&mut self, face: Face) -> bool {
        let changed = self.placement.set_target_face(face);
        if changed {
            self.notify(Change::Placement);
        }
        changed
    }

    /// Drop the pending device without placing it.
    pub fn cancel_placement(&mut self) -> Option<PendingPlacement> {
        let cancelled = self.placement.cancel_placement();
        if cancelled.is_some() {
            self.notify(Change::Placement);
        }
        cancelled
    }

    /// Place the pending device at `position` in `rack_id` as a recorded action,
    /// then return to idle. On rejection the device stays pending.
    ///
    /// # Errors
    ///
    /// `NoPendingPlacement`, `RackNotFound`, or a `Placement` rejection.
    pub fn commit_placement(&mut self, rack_id: &str, position: InternalUnit) -> Result<EntityId, StoreError> {
        let Some(pending) = self.placement.pending() else {
            tracing::warn!(action = "commit_placement", "no pending placement");
            return Err(StoreError::NoPendingPlacement);
        };
        let (slug, face) = (pending.device_type.slug.clone(), pending.face);
        let device_id = self.place_device_recorded(rack_id, &slug, position, face)?;
        self.placement.complete_placement();
        self.notify(Change::Placement);
        Ok(device_id)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Whole-U drop targets for `slug` on `face` in a rack.
    ///
    /// # Errors
    ///
    /// `RackNotFound` or `Placement(UnknownDeviceType)`.
    pub fn valid_positions(&self, rack_id: &str, slug: &str, face: Face) -> Result<Vec<InternalUnit>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        Ok(collision::valid_positions(rack, &self.layout, slug, face)?)
    }

    /// Lowest whole-U position where `slug` fits on `face`.
    ///
    /// # Errors
    ///
    /// `RackNotFound` or `Placement(UnknownDeviceType)`.
    pub fn first_free_position(
        &self,
        rack_id: &str,
        slug: &str,
        face: Face,
    ) -> Result<Option<InternalUnit>, StoreError> {
        let rack = self.find_rack(rack_id)?;
        Ok(collision::first_free_position(rack, &self.layout, slug, face)?)
    }
}

fn check_rack_height(height: u32) -> Result<(), StoreError> {
    if height == 0 || height > MAX_RACK_HEIGHT {
        return Err(StoreError::InvalidRackHeight(height));
    }
    Ok(())
}

fn check_device_height(u_height: f64) -> Result<(), StoreError> {
    if !u_height.is_finite() || u_height > MAX_DEVICE_HEIGHT_U || height_to_internal(u_height) < MIN_DEVICE_HEIGHT {
        return Err(StoreError::InvalidDeviceHeight(u_height));
    }
    Ok(())
}
