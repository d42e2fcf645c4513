//! Core of a rack-layout editor: racks, the devices mounted in them, and an
//! undo/redo history over every edit.
//!
//! All positions and heights are integer internal units (6 per rack unit), so
//! half-U devices and the three mounting holes per U are exact. The engine is
//! synchronous and single-threaded: each call is one complete transaction.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Editor session: recorded actions, undo/redo, getters, observers |
//! | [`layout`] | Document model (layout, racks, devices, device types, groups) and queries |
//! | [`collision`] | Pure placement validation: bounds, alignment, overlap, face/depth rules |
//! | [`command`] | Reversible commands with owned snapshots |
//! | [`history`] | Bounded undo/redo stacks |
//! | [`placement`] | Tap-to-place state machine |
//! | [`catalog`] | Starter device library and device-type lookup |
//! | [`units`] | Internal-unit arithmetic and position labels |
//! | [`identity`] | Layout UUIDs and device-type slugs |
//! | [`file`] | YAML load/save |
//! | [`config`] | Editor configuration from the environment |
//! | [`error`] | Stable error codes |
//! | [`consts`] | Shared numeric constants |

pub mod catalog;
pub mod collision;
pub mod command;
pub mod config;
pub mod consts;
pub mod error;
pub mod file;
pub mod history;
pub mod identity;
pub mod layout;
pub mod placement;
mod raw;
pub mod store;
pub mod units;

pub use collision::PlacementError;
pub use config::EditorConfig;
pub use error::ErrorCode;
pub use layout::{DeviceType, Face, Layout, PlacedDevice, Rack, RackGroup};
pub use store::{Change, LayoutStore, StoreError};
