//! Shared builders for tests and examples. Gated behind the `test-utils`
//! feature.

use crate::config::Tunables;
use crate::container::ResourceKind;
use crate::device::{Device, DeviceKind, Generator};
use crate::fixed::{f64_to_fixed64, Fixed64};
use crate::grid::{Face, GridPos};
use crate::id::DeviceTypeId;
use crate::item::ItemStack;
use crate::registry::{DeviceSpec, Registry, RegistryBuilder};
use crate::world::World;

/// The standard content set used across the test suite:
/// items `flux_crystal` -> `stable_alloy` via recipe `fuse_alloy`,
/// `graviton_rod` as fuel, `entropy_biomass` as decay yield, and
/// `charged_eye` as a chargeable item. Device types: `fuser` (converter),
/// `turbine` (generator), `cell` (charge reservoir), `sump` (entropy
/// reservoir), `duct` (charge conduit), `apex` (amplifier),
/// `decay_chamber`, and `locker` (item storage).
pub fn basic_registry() -> Registry {
    basic_registry_with(&Tunables::default())
}

/// Same content set, with fuel values taken from the given tunables.
pub fn basic_registry_with(tunables: &Tunables) -> Registry {
    let mut b = RegistryBuilder::new();
    let crystal = b.register_item("flux_crystal", None);
    let alloy = b.register_item("stable_alloy", None);
    let rod = b.register_item("graviton_rod", None);
    let biomass = b.register_item("entropy_biomass", None);
    let _eye = b.register_item("charged_eye", Some(1_000_000));
    b.register_fuel(rod, tunables.generator_burn_steps_per_fuel);

    let fuse = b.register_recipe("fuse_alloy", crystal, 2, alloy, 1);
    b.register_device("fuser", DeviceSpec::Converter { recipe: fuse, fuel_item: rod });
    b.register_device("turbine", DeviceSpec::Generator { fuel_item: rod });
    b.register_device("cell", DeviceSpec::Reservoir { kind: ResourceKind::Charge });
    b.register_device("sump", DeviceSpec::Reservoir { kind: ResourceKind::Entropy });
    b.register_device("duct", DeviceSpec::Conduit { kind: ResourceKind::Charge });
    b.register_device("apex", DeviceSpec::Amplifier);
    b.register_device("decay_chamber", DeviceSpec::Decay { yield_item: biomass });
    b.register_device("locker", DeviceSpec::Locker { slots: 9 });

    b.build().expect("basic registry must build")
}

/// An empty world over [`basic_registry`] with default tunables.
pub fn basic_world() -> World {
    World::new(basic_registry(), Tunables::default())
}

/// An empty world with the given tunables (registry fuel values follow).
pub fn world_with(tunables: Tunables) -> World {
    World::new(basic_registry_with(&tunables), tunables)
}

/// Resolve a device type by name; panics on unknown names.
pub fn type_id(world: &World, name: &str) -> DeviceTypeId {
    world
        .registry()
        .device_id(name)
        .unwrap_or_else(|| panic!("unknown device type {name}"))
}

/// Direct access to a device by position; panics when absent.
pub fn device_at<'a>(world: &'a World, pos: GridPos) -> &'a Device {
    world.device_at(pos).expect("device missing")
}

/// Place a generator at `pos` and load `fuel_units` rods into its fuel
/// slot.
pub fn place_generator_with_fuel(world: &mut World, pos: GridPos, fuel_units: u32) {
    let turbine = type_id(world, "turbine");
    let rod = world.registry().item_id("graviton_rod").expect("rod item");
    let _ = world.add_device(pos, Face::North, turbine).expect("placement");
    let device = world.device_at_mut(pos).expect("device");
    let DeviceKind::Generator(g) = &mut device.kind else {
        panic!("expected generator");
    };
    let _ = g
        .inventory
        .insert(Generator::FUEL_SLOT, ItemStack::new(rod, fuel_units), false);
}

/// Read a generator's output charge.
pub fn generator_charge(world: &World, pos: GridPos) -> u32 {
    let DeviceKind::Generator(g) = &device_at(world, pos).kind else {
        panic!("expected generator");
    };
    g.output.quantity()
}

/// Read a generator's boost multiplier.
pub fn generator_boost(world: &World, pos: GridPos) -> Fixed64 {
    let DeviceKind::Generator(g) = &device_at(world, pos).kind else {
        panic!("expected generator");
    };
    g.boost.multiplier()
}

/// Read a reservoir's stored quantity.
pub fn reservoir_quantity(world: &World, pos: GridPos) -> u32 {
    let DeviceKind::Reservoir(r) = &device_at(world, pos).kind else {
        panic!("expected reservoir");
    };
    r.store.quantity()
}

/// Fill a reservoir's store directly.
pub fn fill_reservoir(world: &mut World, pos: GridPos, amount: u32) {
    let device = world.device_at_mut(pos).expect("device");
    let DeviceKind::Reservoir(r) = &mut device.kind else {
        panic!("expected reservoir");
    };
    let _ = r.store.fill_internal(amount);
}

/// Place the complete casing layers for an amplifier tier below `pos`.
pub fn build_amplifier_casing(world: &mut World, pos: GridPos, layers: i32) {
    for layer in 1..=layers {
        let half = layer + 1;
        for dx in -half..=half {
            for dz in -half..=half {
                let _ = world.add_casing(GridPos::new(pos.x + dx, pos.y - layer, pos.z + dz));
            }
        }
    }
}

/// Place a 2-high casing column adjacent to a decay chamber at `pos`.
pub fn build_chamber_casing(world: &mut World, pos: GridPos) {
    let base = pos.offset(Face::North);
    let _ = world.add_casing(base);
    let _ = world.add_casing(base.offset(Face::Up));
}

/// A small working production line: a fueled turbine at the origin
/// pushing charge into a fuser east of it (crystals loaded), with a cell
/// east of the fuser. Used by determinism and persistence tests.
pub fn production_line_world() -> World {
    let mut world = basic_world();
    let origin = GridPos::new(0, 0, 0);
    place_generator_with_fuel(&mut world, origin, 8);

    let fuser_pos = origin.offset(Face::East);
    let fuser = type_id(&world, "fuser");
    let _ = world.add_device(fuser_pos, Face::North, fuser).expect("fuser");
    let crystal = world.registry().item_id("flux_crystal").expect("crystal");
    {
        let device = world.device_at_mut(fuser_pos).expect("fuser device");
        let DeviceKind::Converter(c) = &mut device.kind else {
            panic!("expected converter");
        };
        let _ = c.inventory.insert(
            crate::device::Converter::INPUT_SLOT,
            ItemStack::new(crystal, 32),
            false,
        );
    }

    let cell_pos = fuser_pos.offset(Face::East);
    let cell = type_id(&world, "cell");
    let _ = world.add_device(cell_pos, Face::North, cell).expect("cell");

    world
}

/// Convenience wrapper for fixed-point literals in tests.
pub fn fx(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}
