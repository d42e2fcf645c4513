//! Property-based invariant tests for the layout store and its history.
//!
//! 1. Undo n then redo n reproduces the pre-undo layout exactly
//! 2. Undoing everything returns to the baseline layout
//! 3. Rejected actions leave the layout and history untouched
//! 4. No two devices in a rack ever conflict
//! 5. Whole sixths of a U survive internal/human conversion
//! 6. Overlap rejection does not depend on insertion order

use proptest::prelude::*;
use rackplan::catalog::DeviceTypeLookup;
use rackplan::collision::{self, span};
use rackplan::config::EditorConfig;
use rackplan::history::HistoryConfig;
use rackplan::layout::GroupLayout;
use rackplan::units::{to_human, to_internal};
use rackplan::{Face, LayoutStore};

// ── Strategies ──────────────────────────────────────────────────────────

const SLUGS: [&str; 6] = ["server-1u", "server-2u", "switch-1u", "blank-0-5u", "patch-panel-1u", "storage-2u"];

#[derive(Debug, Clone)]
enum Op {
    Place { rack: usize, slug: usize, hole: i32, rear: bool },
    Move { rack: usize, device: usize, hole: i32 },
    Remove { rack: usize, device: usize },
    Flip { rack: usize, device: usize },
    AddRack { height: u32 },
    DeleteRack { rack: usize },
    ClearRack { rack: usize },
    Group { rack: usize },
    Ungroup { rack: usize },
    Rename(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4, 0usize..SLUGS.len(), 0i32..80, any::<bool>())
            .prop_map(|(rack, slug, hole, rear)| Op::Place { rack, slug, hole, rear }),
        2 => (0usize..4, 0usize..8, 0i32..80).prop_map(|(rack, device, hole)| Op::Move { rack, device, hole }),
        1 => (0usize..4, 0usize..8).prop_map(|(rack, device)| Op::Remove { rack, device }),
        1 => (0usize..4, 0usize..8).prop_map(|(rack, device)| Op::Flip { rack, device }),
        1 => (0u32..30).prop_map(|height| Op::AddRack { height }),
        1 => (0usize..4).prop_map(|rack| Op::DeleteRack { rack }),
        1 => (0usize..4).prop_map(|rack| Op::ClearRack { rack }),
        1 => (0usize..4).prop_map(|rack| Op::Group { rack }),
        1 => (0usize..4).prop_map(|rack| Op::Ungroup { rack }),
        1 => any::<u8>().prop_map(Op::Rename),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..40)
}

/// A store with two 12U racks, unbounded history, and no undo baseline.
fn seeded_store() -> LayoutStore {
    let config = EditorConfig { history: HistoryConfig { max_depth: 0 }, ..EditorConfig::default() };
    let mut store = LayoutStore::with_config(config);
    for name in ["A", "B"] {
        store.add_rack(name, 12).unwrap();
    }
    store.clear_history();
    store
}

fn rack_id(store: &LayoutStore, pick: usize) -> String {
    let racks = store.racks();
    if racks.is_empty() {
        return String::from("missing");
    }
    racks[pick % racks.len()].id.clone()
}

fn device_id(store: &LayoutStore, rack: &str, pick: usize) -> String {
    match store.rack(rack) {
        Some(r) if !r.devices.is_empty() => r.devices[pick % r.devices.len()].id.clone(),
        _ => String::from("missing"),
    }
}

/// Apply one op. Returns whether the store accepted it.
fn apply(store: &mut LayoutStore, op: &Op) -> bool {
    match op {
        Op::Place { rack, slug, hole, rear } => {
            let rack = rack_id(store, *rack);
            let face = if *rear { Face::Rear } else { Face::Front };
            store.place_device_recorded(&rack, SLUGS[*slug], hole * 2, face).is_ok()
        }
        Op::Move { rack, device, hole } => {
            let rack = rack_id(store, *rack);
            let device = device_id(store, &rack, *device);
            store.move_device_recorded(&rack, &device, hole * 2).is_ok()
        }
        Op::Remove { rack, device } => {
            let rack = rack_id(store, *rack);
            let device = device_id(store, &rack, *device);
            store.remove_device_recorded(&rack, &device).is_ok()
        }
        Op::Flip { rack, device } => {
            let rack = rack_id(store, *rack);
            let device = device_id(store, &rack, *device);
            let face = store
                .rack(&rack)
                .and_then(|r| r.device(&device))
                .map_or(Face::Front, |d| d.face.opposite());
            store.set_device_face_recorded(&rack, &device, face).is_ok()
        }
        Op::AddRack { height } => store.add_rack("R", *height).is_ok(),
        Op::DeleteRack { rack } => {
            let rack = rack_id(store, *rack);
            store.delete_rack(&rack).is_ok()
        }
        Op::ClearRack { rack } => {
            let rack = rack_id(store, *rack);
            let before = store.history().undo_depth();
            store.clear_rack(&rack).is_ok() && store.history().undo_depth() > before
        }
        Op::Group { rack } => {
            let rack = rack_id(store, *rack);
            store.create_rack_group("G", &[rack.as_str()], GroupLayout::Bayed).is_ok()
        }
        Op::Ungroup { rack } => {
            let rack = rack_id(store, *rack);
            store.remove_rack_from_group(&rack).is_ok()
        }
        Op::Rename(n) => {
            store.rename_layout(format!("layout-{n}"));
            true
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1–2. Undo/redo exactness
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn undo_n_then_redo_n_is_identity(ops in ops_strategy(), n in 0usize..40) {
        let mut store = seeded_store();
        for op in &ops {
            apply(&mut store, op);
        }
        let after = store.layout().clone();
        let n = n.min(store.history().undo_depth());

        for _ in 0..n {
            prop_assert!(store.undo().is_some());
        }
        for _ in 0..n {
            prop_assert!(store.redo().is_some());
        }
        prop_assert_eq!(store.layout(), &after);
        prop_assert!(!store.can_redo());
    }

    #[test]
    fn undo_everything_restores_baseline(ops in ops_strategy()) {
        let mut store = seeded_store();
        let baseline = store.layout().clone();
        for op in &ops {
            apply(&mut store, op);
        }
        while store.undo().is_some() {}
        prop_assert_eq!(store.layout(), &baseline);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Rejections are side-effect free
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rejected_ops_change_nothing(ops in ops_strategy()) {
        let mut store = seeded_store();
        for op in &ops {
            let before = store.layout().clone();
            let depth = store.history().undo_depth();
            if !apply(&mut store, op) {
                prop_assert_eq!(store.layout(), &before, "{:?} rejected but mutated", op);
                prop_assert_eq!(store.history().undo_depth(), depth);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. No conflicting devices
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn devices_never_conflict(ops in ops_strategy()) {
        let mut store = seeded_store();
        for op in &ops {
            apply(&mut store, op);
            let layout = store.layout();
            for rack in &layout.racks {
                for device in &rack.devices {
                    let Some(dt) = layout.device_type(&device.device_type) else {
                        continue;
                    };
                    let hits = collision::find_collisions(
                        rack,
                        layout,
                        span(device.position, dt),
                        device.face,
                        dt.is_full_depth,
                        Some(&device.id),
                    );
                    prop_assert!(hits.is_empty(), "{} conflicts after {:?}", device.id, op);
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5–6. Arithmetic and symmetry
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sixths_round_trip(sixths in -6000i32..6000) {
        let human = f64::from(sixths) / 6.0;
        prop_assert_eq!(to_internal(human), sixths);
        prop_assert!((to_human(to_internal(human)) - human).abs() < 1e-9);
    }

    #[test]
    fn overlap_is_order_independent(
        a_slug in 0usize..SLUGS.len(),
        b_slug in 0usize..SLUGS.len(),
        a_hole in 3i32..34,
        b_hole in 3i32..34,
        a_rear in any::<bool>(),
        b_rear in any::<bool>(),
    ) {
        let face = |rear: bool| if rear { Face::Rear } else { Face::Front };
        let mut outcomes = Vec::new();
        for ((first, fh, fr), (second, sh, sr)) in [
            ((a_slug, a_hole, a_rear), (b_slug, b_hole, b_rear)),
            ((b_slug, b_hole, b_rear), (a_slug, a_hole, a_rear)),
        ] {
            let mut store = seeded_store();
            let rack = rack_id(&store, 0);
            prop_assert!(store.place_device_recorded(&rack, SLUGS[first], fh * 2, face(fr)).is_ok());
            outcomes.push(store.place_device_recorded(&rack, SLUGS[second], sh * 2, face(sr)).is_ok());
        }
        prop_assert_eq!(outcomes[0], outcomes[1]);
    }
}
