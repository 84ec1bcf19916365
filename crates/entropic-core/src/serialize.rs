//! Versioned world snapshots.
//!
//! Device state is flattened into [`DeviceRecord`]s keyed by stable field
//! names, wrapped in a header with a magic number and format version, and
//! encoded with `bitcode`. Loading is tolerant: missing fields take
//! validated defaults, out-of-range values are clamped, and records that
//! cannot be resolved against the registry are dropped rather than
//! failing the whole snapshot.

use crate::boost::AmplifierTier;
use crate::decay::{DecayPhase, SubjectSnapshot};
use crate::device::{Device, DeviceKind};
use crate::fixed::{Fixed64, Steps};
use crate::grid::{Face, GridPos, SideConfig};
use crate::id::{DeviceTypeId, ItemTypeId};
use crate::item::{Inventory, ItemStack};
use crate::registry::Registry;
use crate::config::Tunables;
use crate::world::World;
use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a world snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xE774_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub step: Steps,
}

impl SnapshotHeader {
    pub fn new(step: Steps) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            step,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        Ok(())
    }
}

/// One occupied inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub slot: u32,
    pub item_type: u32,
    pub quantity: u32,
    #[serde(default)]
    pub charge: Option<u32>,
}

fn default_multiplier_bits() -> i64 {
    Fixed64::from_num(1).to_bits()
}

/// Flattened persistent state of one device. Fields irrelevant to a
/// device's kind stay at their defaults and are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub pos: GridPos,
    pub facing: u8,
    pub device_type: u32,
    #[serde(default)]
    pub side_modes: [u8; 6],
    /// Primary container quantity.
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub burn_steps: u32,
    #[serde(default)]
    pub max_burn_steps: u32,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub slots: Vec<SlotRecord>,
    #[serde(default = "default_multiplier_bits")]
    pub boost_multiplier_bits: i64,
    #[serde(default)]
    pub boost_expiry: u32,
    #[serde(default)]
    pub decay_phase: u8,
    #[serde(default)]
    pub decay_progress: u32,
    #[serde(default)]
    pub decay_duration: u32,
    #[serde(default)]
    pub subject_payload: Option<Vec<u8>>,
    #[serde(default)]
    pub subject_metric_bits: i64,
    #[serde(default)]
    pub tier: u8,
    #[serde(default)]
    pub scan_timer: u32,
    #[serde(default)]
    pub push_timer: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorldSnapshot {
    header: SnapshotHeader,
    devices: Vec<DeviceRecord>,
    casing: Vec<GridPos>,
    unloaded: Vec<GridPos>,
}

// ---------------------------------------------------------------------------
// Device <-> record
// ---------------------------------------------------------------------------

fn inventory_records(inventory: &Inventory) -> Vec<SlotRecord> {
    (0..inventory.slot_count())
        .filter_map(|slot| {
            inventory.stack_in(slot).map(|stack| SlotRecord {
                slot: slot as u32,
                item_type: stack.item_type.0,
                quantity: stack.quantity,
                charge: stack.charge,
            })
        })
        .collect()
}

fn restore_inventory(inventory: &mut Inventory, records: &[SlotRecord], registry: &Registry) {
    for slot in 0..inventory.slot_count() {
        inventory.set_stack(slot, None);
    }
    for record in records {
        let slot = record.slot as usize;
        if slot >= inventory.slot_count() {
            continue;
        }
        let item_type = ItemTypeId(record.item_type);
        if registry.get_item(item_type).is_none() {
            continue;
        }
        let quantity = record.quantity.min(inventory.limit(slot));
        if quantity == 0 {
            continue;
        }
        inventory.set_stack(
            slot,
            Some(ItemStack {
                item_type,
                quantity,
                charge: record.charge,
            }),
        );
    }
}

/// Flatten a device into its persistent record.
pub fn device_to_record(device: &Device) -> DeviceRecord {
    let mut record = DeviceRecord {
        pos: device.pos,
        facing: device.facing.ordinal(),
        device_type: device.device_type.0,
        side_modes: device.side_config.to_ordinals(),
        quantity: 0,
        burn_steps: 0,
        max_burn_steps: 0,
        progress: 0,
        slots: Vec::new(),
        boost_multiplier_bits: default_multiplier_bits(),
        boost_expiry: 0,
        decay_phase: 0,
        decay_progress: 0,
        decay_duration: 0,
        subject_payload: None,
        subject_metric_bits: 0,
        tier: 0,
        scan_timer: 0,
        push_timer: 0,
    };
    match &device.kind {
        DeviceKind::Converter(c) => {
            record.quantity = c.energy.container.quantity();
            record.burn_steps = c.energy.fuel.burn_steps_remaining();
            record.max_burn_steps = c.energy.fuel.max_burn_steps();
            record.progress = c.process.progress();
            record.slots = inventory_records(&c.inventory);
            record.push_timer = c.automation.timer();
        }
        DeviceKind::Generator(g) => {
            record.quantity = g.output.quantity();
            record.burn_steps = g.fuel.burn_steps_remaining();
            record.max_burn_steps = g.fuel.max_burn_steps();
            record.slots = inventory_records(&g.inventory);
            record.boost_multiplier_bits = g.boost.multiplier().to_bits();
            record.boost_expiry = g.boost.expiry_steps();
        }
        DeviceKind::Reservoir(r) => {
            record.quantity = r.store.quantity();
            record.slots = inventory_records(&r.dock);
        }
        DeviceKind::Conduit(_) => {}
        DeviceKind::Amplifier(a) => {
            record.tier = a.state.tier.ordinal();
            record.scan_timer = a.state.scan_timer;
        }
        DeviceKind::Decay(d) => {
            record.decay_phase = d.chamber.phase.ordinal();
            record.decay_progress = d.chamber.progress;
            record.decay_duration = d.chamber.duration;
            if let Some(subject) = &d.chamber.subject {
                record.subject_payload = Some(subject.payload.clone());
                record.subject_metric_bits = subject.metric.to_bits();
            }
            record.slots = inventory_records(&d.chamber.output);
        }
        DeviceKind::Locker(l) => {
            record.slots = inventory_records(&l.inventory);
        }
    }
    record
}

/// Apply a persisted record to a freshly built device, clamping every
/// field into validity.
pub fn apply_record(device: &mut Device, record: &DeviceRecord, registry: &Registry) {
    device.side_config = SideConfig::from_ordinals(record.side_modes);
    match &mut device.kind {
        DeviceKind::Converter(c) => {
            c.energy.container.set_quantity(record.quantity);
            c.energy.fuel.restore(record.burn_steps, record.max_burn_steps);
            c.process.restore(record.progress, c.recipe.duration);
            restore_inventory(&mut c.inventory, &record.slots, registry);
            c.automation.restore(record.push_timer, u32::MAX);
        }
        DeviceKind::Generator(g) => {
            g.output.set_quantity(record.quantity);
            g.fuel.restore(record.burn_steps, record.max_burn_steps);
            restore_inventory(&mut g.inventory, &record.slots, registry);
            g.boost.restore(
                Fixed64::from_bits(record.boost_multiplier_bits),
                record.boost_expiry,
            );
        }
        DeviceKind::Reservoir(r) => {
            r.store.set_quantity(record.quantity);
            restore_inventory(&mut r.dock, &record.slots, registry);
        }
        DeviceKind::Conduit(_) => {}
        DeviceKind::Amplifier(a) => {
            a.state.tier = AmplifierTier::from_ordinal(record.tier);
            a.state.scan_timer = record.scan_timer.min(a.scan_interval);
        }
        DeviceKind::Decay(d) => {
            d.chamber.phase = DecayPhase::from_ordinal(record.decay_phase);
            d.chamber.duration = record.decay_duration;
            d.chamber.progress = record.decay_progress;
            d.chamber.subject = record.subject_payload.as_ref().map(|payload| SubjectSnapshot {
                payload: payload.clone(),
                metric: Fixed64::from_bits(record.subject_metric_bits),
            });
            restore_inventory(&mut d.chamber.output, &record.slots, registry);
            d.chamber.sanitize();
        }
        DeviceKind::Locker(l) => {
            restore_inventory(&mut l.inventory, &record.slots, registry);
        }
    }
}

// ---------------------------------------------------------------------------
// World snapshots
// ---------------------------------------------------------------------------

impl World {
    /// Serialize the whole world into a versioned snapshot.
    pub fn snapshot(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = WorldSnapshot {
            header: SnapshotHeader::new(self.current_step()),
            devices: self.devices_in_order().map(device_to_record).collect(),
            casing: self.casing_sorted(),
            unloaded: self.unloaded_sorted(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Rebuild a world from a snapshot against the given registry and
    /// tunables. Unresolvable device records (unknown type, occupied
    /// position) are dropped; everything else is clamped into validity.
    pub fn restore(
        data: &[u8],
        registry: Registry,
        tunables: Tunables,
    ) -> Result<World, DeserializeError> {
        let snapshot: WorldSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        let mut world = World::new(registry, tunables);
        for pos in snapshot.casing {
            let _ = world.add_casing(pos);
        }
        for record in &snapshot.devices {
            let facing = Face::from_ordinal(record.facing);
            let Some(_) = world.add_device(record.pos, facing, DeviceTypeId(record.device_type))
            else {
                continue;
            };
            world.apply_device_record(record.pos, record);
        }
        for pos in snapshot.unloaded {
            world.set_loaded(pos, false);
        }
        world.restore_step(snapshot.header.step);
        Ok(world)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip_validates() {
        let header = SnapshotHeader::new(42);
        assert!(header.validate().is_ok());
    }

    #[test]
    fn header_rejects_bad_magic() {
        let header = SnapshotHeader {
            magic: 0xDEAD_BEEF,
            version: FORMAT_VERSION,
            step: 0,
        };
        assert!(matches!(
            header.validate(),
            Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))
        ));
    }

    #[test]
    fn header_rejects_future_version() {
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION + 1,
            step: 0,
        };
        assert!(matches!(
            header.validate(),
            Err(DeserializeError::FutureVersion(_))
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let registry = crate::test_utils::basic_registry();
        let result = World::restore(&[1, 2, 3, 4], registry, Tunables::default());
        assert!(matches!(result, Err(DeserializeError::Decode(_))));
    }
}
