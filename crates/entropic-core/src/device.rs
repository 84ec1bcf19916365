//! Devices: plain structs of independently owned components.
//!
//! Every device is a position, a facing, a side configuration, and one
//! [`DeviceKind`] variant holding the components that kind actually uses.
//! Dispatch is by enum match; narrow accessor functions (the "ports" below)
//! expose single components to the service registry without any
//! inheritance or trait objects.

use crate::access::{ItemPort, SlotRoles};
use crate::automation::Automation;
use crate::boost::{AmplifierState, BoostState};
use crate::container::{ResourceContainer, ResourceKind};
use crate::decay::DecayChamber;
use crate::grid::{Face, GridPos, SideConfig, SideMode};
use crate::id::{DeviceTypeId, ItemTypeId};
use crate::item::Inventory;
use crate::process::{EnergyCore, FuelState, ProcessContract, ProcessState};
use crate::sim::StateHash;

/// Default per-slot item limit for device inventories.
pub const SLOT_LIMIT: u32 = 64;

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// A converter's resolved recipe: one input type, one output type, and the
/// timing/cost taken from the tunables at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub input: ItemTypeId,
    pub input_count: u32,
    pub output: ItemTypeId,
    pub output_count: u32,
    pub duration: u32,
    pub step_cost: u32,
}

/// [`ProcessContract`] view over a converter recipe and its slot layout.
pub struct RecipeProcess<'a> {
    pub recipe: &'a Recipe,
}

impl ProcessContract for RecipeProcess<'_> {
    fn can_process(&self, inventory: &Inventory) -> bool {
        let has_input = inventory
            .stack_in(Converter::INPUT_SLOT)
            .is_some_and(|s| s.item_type == self.recipe.input && s.quantity >= self.recipe.input_count);
        if !has_input {
            return false;
        }
        let out = crate::item::ItemStack::new(self.recipe.output, self.recipe.output_count);
        inventory.space_for(Converter::OUTPUT_SLOT, &out) >= self.recipe.output_count
    }

    fn complete(&mut self, inventory: &mut Inventory) {
        let _ = inventory.extract(Converter::INPUT_SLOT, self.recipe.input_count, false);
        let out = crate::item::ItemStack::new(self.recipe.output, self.recipe.output_count);
        // can_process checked the space; a remainder here cannot happen.
        let _ = inventory.insert(Converter::OUTPUT_SLOT, out, false);
    }

    fn duration(&self) -> u32 {
        self.recipe.duration
    }

    fn step_cost(&self) -> u32 {
        self.recipe.step_cost
    }
}

// ---------------------------------------------------------------------------
// Device kinds
// ---------------------------------------------------------------------------

/// Recipe machine: consumes input items and power, emits output items.
/// Hybrid power with a fuel fallback slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    pub energy: EnergyCore,
    pub inventory: Inventory,
    pub process: ProcessState,
    pub automation: Automation,
    pub roles: SlotRoles,
    pub recipe: Recipe,
}

impl Converter {
    pub const INPUT_SLOT: usize = 0;
    pub const FUEL_SLOT: usize = 1;
    pub const OUTPUT_SLOT: usize = 2;
}

/// Fuel-burning producer: emits charge into its own container while
/// burning, scaled by the received boost, and pushes charge to neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub output: ResourceContainer,
    pub inventory: Inventory,
    pub fuel: FuelState,
    pub boost: BoostState,
    pub roles: SlotRoles,
    pub base_rate: u32,
    pub push_rate: u32,
}

impl Generator {
    pub const FUEL_SLOT: usize = 0;
}

/// Buffer: stores one resource kind, pushes through output-enabled faces,
/// and charges a docked item's per-unit payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservoir {
    pub kind: ResourceKind,
    pub store: ResourceContainer,
    pub dock: Inventory,
    pub roles: SlotRoles,
    pub push_rate: u32,
    pub charge_rate: u32,
}

impl Reservoir {
    pub const DOCK_SLOT: usize = 0;
}

/// Stateless transport: pairs extract-capable neighbors with
/// insert-capable neighbors each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conduit {
    pub kind: ResourceKind,
    pub rate: u32,
}

/// Boost source: validates its casing tier and broadcasts the multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amplifier {
    pub state: AmplifierState,
    pub scan_interval: u32,
}

/// Decay line: the capture/decay/yield chamber plus its item port roles.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayDevice {
    pub chamber: DecayChamber,
    pub roles: SlotRoles,
}

/// Passive item storage. Every slot accepts and serves any item.
#[derive(Debug, Clone, PartialEq)]
pub struct Locker {
    pub inventory: Inventory,
    pub roles: SlotRoles,
}

/// The closed set of device kinds. Enum dispatch, no trait objects.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceKind {
    Converter(Converter),
    Generator(Generator),
    Reservoir(Reservoir),
    Conduit(Conduit),
    Amplifier(Amplifier),
    Decay(DecayDevice),
    Locker(Locker),
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// One placed device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub pos: GridPos,
    pub facing: Face,
    pub device_type: DeviceTypeId,
    pub side_config: SideConfig,
    pub kind: DeviceKind,
}

impl Device {
    /// Default side configuration per kind: processors accept input
    /// everywhere (outputs are pushed), movers are open in both directions,
    /// structural devices expose nothing.
    pub fn default_side_config(kind: &DeviceKind) -> SideConfig {
        match kind {
            DeviceKind::Converter(_) | DeviceKind::Decay(_) => SideConfig::uniform(SideMode::Input),
            DeviceKind::Generator(_) | DeviceKind::Reservoir(_) | DeviceKind::Locker(_) => {
                SideConfig::uniform(SideMode::Both)
            }
            DeviceKind::Conduit(_) | DeviceKind::Amplifier(_) => SideConfig::uniform(SideMode::None),
        }
    }

    /// Feed this device's observable state into a deterministic hash.
    pub fn hash_into(&self, h: &mut StateHash) {
        h.write_i32(self.pos.x);
        h.write_i32(self.pos.y);
        h.write_i32(self.pos.z);
        h.write_u32(self.device_type.0);
        for b in self.side_config.to_ordinals() {
            h.write(&[b]);
        }
        match &self.kind {
            DeviceKind::Converter(c) => {
                h.write_u32(c.energy.container.quantity());
                h.write_u32(c.energy.fuel.burn_steps_remaining());
                h.write_u32(c.process.progress());
                h.write_u32(c.automation.timer());
                hash_inventory(&c.inventory, h);
            }
            DeviceKind::Generator(g) => {
                h.write_u32(g.output.quantity());
                h.write_u32(g.fuel.burn_steps_remaining());
                h.write_fixed64(g.boost.multiplier());
                h.write_u32(g.boost.expiry_steps());
                hash_inventory(&g.inventory, h);
            }
            DeviceKind::Reservoir(r) => {
                h.write_u32(r.store.quantity());
                hash_inventory(&r.dock, h);
            }
            DeviceKind::Conduit(c) => {
                h.write_u32(c.rate);
            }
            DeviceKind::Amplifier(a) => {
                h.write(&[a.state.tier.ordinal()]);
                h.write_u32(a.state.scan_timer);
            }
            DeviceKind::Decay(d) => {
                h.write(&[d.chamber.phase.ordinal()]);
                h.write_u32(d.chamber.progress);
                h.write_u32(d.chamber.duration);
                if let Some(subject) = &d.chamber.subject {
                    h.write_fixed64(subject.metric);
                    h.write(&subject.payload);
                }
                hash_inventory(&d.chamber.output, h);
            }
            DeviceKind::Locker(l) => {
                hash_inventory(&l.inventory, h);
            }
        }
    }
}

fn hash_inventory(inventory: &Inventory, h: &mut StateHash) {
    for slot in 0..inventory.slot_count() {
        match inventory.stack_in(slot) {
            Some(stack) => {
                h.write_u32(stack.item_type.0);
                h.write_u32(stack.quantity);
                h.write_u32(stack.charge.unwrap_or(0));
            }
            None => h.write_u32(u32::MAX),
        }
    }
}

// ---------------------------------------------------------------------------
// Ports (service accessors)
// ---------------------------------------------------------------------------

/// Narrow accessor functions resolved once through the service registry.
/// Each returns the requested component when the device kind carries it.
pub mod ports {
    use super::*;

    pub fn charge_container(d: &mut Device) -> Option<&mut ResourceContainer> {
        match &mut d.kind {
            DeviceKind::Converter(c) => Some(&mut c.energy.container),
            DeviceKind::Generator(g) => Some(&mut g.output),
            DeviceKind::Reservoir(r) if r.kind == ResourceKind::Charge => Some(&mut r.store),
            _ => None,
        }
    }

    pub fn entropy_container(d: &mut Device) -> Option<&mut ResourceContainer> {
        match &mut d.kind {
            DeviceKind::Reservoir(r) if r.kind == ResourceKind::Entropy => Some(&mut r.store),
            _ => None,
        }
    }

    pub fn items(d: &mut Device) -> Option<ItemPort<'_>> {
        let facing = d.facing;
        let config = &d.side_config;
        match &mut d.kind {
            DeviceKind::Converter(c) => Some(ItemPort {
                inventory: &mut c.inventory,
                roles: &c.roles,
                config,
                facing,
            }),
            DeviceKind::Generator(g) => Some(ItemPort {
                inventory: &mut g.inventory,
                roles: &g.roles,
                config,
                facing,
            }),
            DeviceKind::Reservoir(r) => Some(ItemPort {
                inventory: &mut r.dock,
                roles: &r.roles,
                config,
                facing,
            }),
            DeviceKind::Decay(dc) => Some(ItemPort {
                inventory: &mut dc.chamber.output,
                roles: &dc.roles,
                config,
                facing,
            }),
            DeviceKind::Locker(l) => Some(ItemPort {
                inventory: &mut l.inventory,
                roles: &l.roles,
                config,
                facing,
            }),
            _ => None,
        }
    }

    pub fn boost(d: &mut Device) -> Option<&mut BoostState> {
        match &mut d.kind {
            DeviceKind::Generator(g) => Some(&mut g.boost),
            _ => None,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
