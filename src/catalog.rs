//! Device-type resolution: the layout's custom catalog plus a read-only starter library.
//!
//! Placements reference device types by slug. Resolution checks the layout's
//! own custom types first, then the built-in starter library. The collision
//! engine only sees the [`DeviceTypeLookup`] trait, so it can be handed a
//! layout, or a layout with one type swapped out for a what-if resize check.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::sync::OnceLock;

use crate::layout::{Airflow, DanglingPlacement, DeviceCategory, DeviceType, Layout};

/// Anything that can resolve a device-type slug.
pub trait DeviceTypeLookup {
    fn device_type(&self, slug: &str) -> Option<&DeviceType>;
}

impl DeviceTypeLookup for Layout {
    fn device_type(&self, slug: &str) -> Option<&DeviceType> {
        self.custom_device_type(slug).or_else(|| starter_device_type(slug))
    }
}

/// A lookup that answers with `replacement` for its slug and defers to `base` otherwise.
pub struct WithReplacement<'a, L: ?Sized> {
    base: &'a L,
    replacement: &'a DeviceType,
}

impl<'a, L: DeviceTypeLookup + ?Sized> WithReplacement<'a, L> {
    #[must_use]
    pub fn new(base: &'a L, replacement: &'a DeviceType) -> Self {
        Self { base, replacement }
    }
}

impl<L: DeviceTypeLookup + ?Sized> DeviceTypeLookup for WithReplacement<'_, L> {
    fn device_type(&self, slug: &str) -> Option<&DeviceType> {
        if slug == self.replacement.slug {
            Some(self.replacement)
        } else {
            self.base.device_type(slug)
        }
    }
}

/// The built-in generic device types. Read-only.
#[must_use]
pub fn starter_library() -> &'static [DeviceType] {
    static LIBRARY: OnceLock<Vec<DeviceType>> = OnceLock::new();
    LIBRARY.get_or_init(build_starter_library)
}

/// A starter-library type by slug.
#[must_use]
pub fn starter_device_type(slug: &str) -> Option<&'static DeviceType> {
    starter_library().iter().find(|dt| dt.slug == slug)
}

/// Whether `slug` names a read-only starter type.
#[must_use]
pub fn is_starter_slug(slug: &str) -> bool {
    starter_device_type(slug).is_some()
}

fn starter(slug: &str, model: &str, u_height: f64, category: DeviceCategory, full_depth: bool) -> DeviceType {
    let mut dt = DeviceType::new(slug, u_height, category);
    dt.model = Some(model.to_string());
    dt.is_full_depth = full_depth;
    dt
}

fn build_starter_library() -> Vec<DeviceType> {
    let mut servers = vec![
        starter("server-1u", "1U Server", 1.0, DeviceCategory::Server, true),
        starter("server-2u", "2U Server", 2.0, DeviceCategory::Server, true),
        starter("server-4u", "4U Server", 4.0, DeviceCategory::Server, true),
    ];
    for server in &mut servers {
        server.airflow = Some(Airflow::FrontToRear);
    }

    let mut library = vec![
        starter("blank-0-5u", "0.5U Blank", 0.5, DeviceCategory::Blank, false),
        starter("blank-1u", "1U Blank", 1.0, DeviceCategory::Blank, false),
        starter("blank-2u", "2U Blank", 2.0, DeviceCategory::Blank, false),
    ];
    library.append(&mut servers);
    library.extend([
        starter("switch-1u", "1U Switch", 1.0, DeviceCategory::Network, false),
        starter("patch-panel-1u", "1U Patch Panel", 1.0, DeviceCategory::PatchPanel, false),
        starter("shelf-1u", "1U Shelf", 1.0, DeviceCategory::Shelf, true),
        starter("shelf-2u", "2U Shelf", 2.0, DeviceCategory::Shelf, true),
        starter("pdu-1u", "1U PDU", 1.0, DeviceCategory::Power, false),
        starter("cable-management-1u", "1U Cable Manager", 1.0, DeviceCategory::CableManagement, false),
        starter("storage-2u", "2U Storage", 2.0, DeviceCategory::Storage, true),
    ]);
    library
}

impl Layout {
    /// Placements whose device type resolves neither in the custom catalog nor the starter library.
    #[must_use]
    pub fn dangling_placements(&self) -> Vec<DanglingPlacement> {
        self.racks
            .iter()
            .flat_map(|rack| {
                rack.devices
                    .iter()
                    .filter(|d| self.device_type(&d.device_type).is_none())
                    .map(|d| DanglingPlacement {
                        rack_id: rack.id.clone(),
                        device_id: d.id.clone(),
                        device_type: d.device_type.clone(),
                    })
            })
            .collect()
    }
}
