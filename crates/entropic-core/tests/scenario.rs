//! End-to-end scenarios over a small grid world.
//!
//! These pin the externally observable timing and accounting contracts:
//! exact completion steps, auto-push timing, boost arbitration and decay,
//! the decay-chamber pipeline, and snapshot round-trips.

use entropic_core::config::Tunables;
use entropic_core::container::ResourceKind;
use entropic_core::device::{Converter, DeviceKind};
use entropic_core::event::SimEvent;
use entropic_core::grid::{Face, GridPos, SideConfig, SideMode};
use entropic_core::id::ActorId;
use entropic_core::item::ItemStack;
use entropic_core::serialize::{apply_record, device_to_record};
use entropic_core::test_utils::*;
use entropic_core::world::World;

fn origin() -> GridPos {
    GridPos::new(0, 0, 0)
}

/// Place a fuser at `pos` with crystals loaded and `energy` charge.
fn place_fuser(world: &mut World, pos: GridPos, crystals: u32, energy: u32) {
    let fuser = type_id(world, "fuser");
    let crystal = world.registry().item_id("flux_crystal").unwrap();
    world.add_device(pos, Face::North, fuser).expect("fuser placement");
    let device = world.device_at_mut(pos).unwrap();
    let DeviceKind::Converter(c) = &mut device.kind else {
        panic!("expected converter");
    };
    if crystals > 0 {
        let _ = c
            .inventory
            .insert(Converter::INPUT_SLOT, ItemStack::new(crystal, crystals), false);
    }
    let _ = c.energy.container.fill_internal(energy);
}

fn fuser_state(world: &World, pos: GridPos) -> (u32, u32, u32, u32) {
    let DeviceKind::Converter(c) = &device_at(world, pos).kind else {
        panic!("expected converter");
    };
    let alloy = c
        .inventory
        .stack_in(Converter::OUTPUT_SLOT)
        .map(|s| s.quantity)
        .unwrap_or(0);
    let crystals = c
        .inventory
        .stack_in(Converter::INPUT_SLOT)
        .map(|s| s.quantity)
        .unwrap_or(0);
    (c.process.progress(), c.energy.container.quantity(), crystals, alloy)
}

// ---------------------------------------------------------------------------
// Processing completion
// ---------------------------------------------------------------------------

#[test]
fn converter_completes_after_exactly_duration_steps() {
    let tunables = Tunables {
        converter_duration: 5,
        converter_step_cost: 10,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    place_fuser(&mut world, origin(), 4, 100);

    world.run(4);
    let (progress, energy, crystals, alloy) = fuser_state(&world, origin());
    assert_eq!(progress, 4);
    assert_eq!(energy, 60);
    assert_eq!(crystals, 4);
    assert_eq!(alloy, 0);

    world.step();
    let (progress, energy, crystals, alloy) = fuser_state(&world, origin());
    assert_eq!(progress, 0);
    assert_eq!(energy, 50);
    assert_eq!(crystals, 2);
    assert_eq!(alloy, 1);

    let events = world.drain_events();
    let completions: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SimEvent::ProcessCompleted { .. }))
        .collect();
    assert_eq!(completions.len(), 1);
    assert!(matches!(
        completions[0],
        SimEvent::ProcessCompleted { step: 5, .. }
    ));
}

#[test]
fn power_withdrawal_wipes_progress() {
    let tunables = Tunables {
        converter_duration: 5,
        converter_step_cost: 10,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    // Charge for exactly three steps, no fuel.
    place_fuser(&mut world, origin(), 8, 30);

    world.run(3);
    assert_eq!(fuser_state(&world, origin()).0, 3);

    world.step();
    let (progress, _, _, alloy) = fuser_state(&world, origin());
    assert_eq!(progress, 0);
    assert_eq!(alloy, 0);

    // Refilled power restarts from zero: five more steps to complete.
    {
        let device = world.device_at_mut(origin()).unwrap();
        let DeviceKind::Converter(c) = &mut device.kind else { panic!() };
        let _ = c.energy.container.fill_internal(50);
    }
    world.run(4);
    assert_eq!(fuser_state(&world, origin()).3, 0);
    world.step();
    assert_eq!(fuser_state(&world, origin()).3, 1);
}

#[test]
fn fuel_ignites_only_when_process_needs_it() {
    let tunables = Tunables {
        converter_duration: 5,
        converter_step_cost: 10,
        generator_burn_steps_per_fuel: 400,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    let rod = world.registry().item_id("graviton_rod").unwrap();

    // A fuser with inputs but no charge: burns fuel to work.
    place_fuser(&mut world, origin(), 4, 0);
    {
        let device = world.device_at_mut(origin()).unwrap();
        let DeviceKind::Converter(c) = &mut device.kind else { panic!() };
        let _ = c
            .inventory
            .insert(Converter::FUEL_SLOT, ItemStack::new(rod, 2), false);
    }

    // A fuser with fuel but nothing to process: fuel must stay untouched.
    let idle_pos = GridPos::new(0, 0, 5);
    place_fuser(&mut world, idle_pos, 0, 0);
    {
        let device = world.device_at_mut(idle_pos).unwrap();
        let DeviceKind::Converter(c) = &mut device.kind else { panic!() };
        let _ = c
            .inventory
            .insert(Converter::FUEL_SLOT, ItemStack::new(rod, 2), false);
    }

    world.run(5);

    let DeviceKind::Converter(c) = &device_at(&world, origin()).kind else { panic!() };
    assert_eq!(c.inventory.stack_in(Converter::FUEL_SLOT).unwrap().quantity, 1);
    assert!(c.energy.fuel.burning());
    assert_eq!(
        c.inventory.stack_in(Converter::OUTPUT_SLOT).unwrap().quantity,
        1
    );

    let DeviceKind::Converter(idle) = &device_at(&world, idle_pos).kind else { panic!() };
    assert_eq!(idle.inventory.stack_in(Converter::FUEL_SLOT).unwrap().quantity, 2);
    assert!(!idle.energy.fuel.burning());
}

// ---------------------------------------------------------------------------
// Auto-push timing
// ---------------------------------------------------------------------------

#[test]
fn auto_push_fires_at_step_ten_exactly() {
    let tunables = Tunables {
        auto_push_interval: 10,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    let alloy = world.registry().item_id("stable_alloy").unwrap();

    place_fuser(&mut world, origin(), 0, 0);
    {
        let device = world.device_at_mut(origin()).unwrap();
        device.side_config = SideConfig::uniform(SideMode::Output);
        let DeviceKind::Converter(c) = &mut device.kind else { panic!() };
        c.inventory
            .set_stack(Converter::OUTPUT_SLOT, Some(ItemStack::new(alloy, 5)));
    }

    let locker_pos = origin().offset(Face::East);
    let locker = type_id(&world, "locker");
    world.add_device(locker_pos, Face::North, locker).expect("locker");

    world.run(9);
    let DeviceKind::Converter(c) = &device_at(&world, origin()).kind else { panic!() };
    assert_eq!(
        c.inventory.stack_in(Converter::OUTPUT_SLOT).unwrap().quantity,
        5,
        "must not push before the interval"
    );

    world.step();
    let DeviceKind::Converter(c) = &device_at(&world, origin()).kind else { panic!() };
    assert!(c.inventory.is_slot_empty(Converter::OUTPUT_SLOT));
    let DeviceKind::Locker(l) = &device_at(&world, locker_pos).kind else { panic!() };
    assert_eq!(l.inventory.quantity_of(alloy), 5);

    let events = world.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::ItemsPushed { quantity: 5, step: 10, .. }
    )));
}

// ---------------------------------------------------------------------------
// Boost propagation
// ---------------------------------------------------------------------------

#[test]
fn boost_highest_wins_and_decays_after_expiry() {
    let tunables = Tunables {
        amplifier_scan_interval: 20,
        boost_expiry_steps: 30,
        generator_base_rate: 256,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);

    place_generator_with_fuel(&mut world, origin(), 1);

    let weak_pos = GridPos::new(10, 5, 0);
    let strong_pos = GridPos::new(-10, 5, 0);
    build_amplifier_casing(&mut world, weak_pos, 1);
    build_amplifier_casing(&mut world, strong_pos, 2);
    let apex = type_id(&world, "apex");
    world.add_device(weak_pos, Face::North, apex).expect("weak apex");
    world.add_device(strong_pos, Face::North, apex).expect("strong apex");

    // Both amplifiers scan on their first step; the stronger offer wins.
    world.step();
    assert_eq!(generator_boost(&world, origin()), fx(8.0));
    let events = world.drain_events();
    let applied = events
        .iter()
        .filter(|e| matches!(e, SimEvent::BoostApplied { .. }))
        .count();
    assert_eq!(applied, 2, "the weaker offer lands first, then is outbid");

    // Generation scales with the active multiplier.
    let before = generator_charge(&world, origin());
    world.step();
    assert_eq!(generator_charge(&world, origin()) - before, 256 * 8);

    // Removed sources stop renewing; the boost decays to 1.0.
    world.remove_device(weak_pos);
    world.remove_device(strong_pos);
    world.run(40);
    assert_eq!(generator_boost(&world, origin()), fx(1.0));
    let events = world.drain_events();
    assert!(events.iter().any(|e| matches!(e, SimEvent::BoostExpired { .. })));
}

#[test]
fn incomplete_casing_yields_no_boost() {
    let tunables = Tunables {
        amplifier_scan_interval: 20,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    place_generator_with_fuel(&mut world, origin(), 1);

    let apex_pos = GridPos::new(5, 5, 0);
    build_amplifier_casing(&mut world, apex_pos, 1);
    // Knock one corner out of the layer.
    world.remove_casing(GridPos::new(3, 4, -2));
    let apex = type_id(&world, "apex");
    world.add_device(apex_pos, Face::North, apex).expect("apex");

    world.run(3);
    assert_eq!(generator_boost(&world, origin()), fx(1.0));
}

// ---------------------------------------------------------------------------
// Decay pipeline
// ---------------------------------------------------------------------------

#[test]
fn decay_pipeline_timing_and_yield() {
    let tunables = Tunables {
        decay_steps_per_unit: 10,
        decay_min_duration: 20,
        capture_cooldown: 100,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    let chamber_pos = origin();
    let chamber = type_id(&world, "decay_chamber");
    world.add_device(chamber_pos, Face::North, chamber).expect("chamber");
    build_chamber_casing(&mut world, chamber_pos);

    let keeper = ActorId(1);
    assert!(world.accept_subject(chamber_pos, keeper, vec![7; 16], fx(40.0)));
    // Occupied chamber rejects a second subject outright.
    assert!(!world.accept_subject(chamber_pos, ActorId(2), vec![], fx(5.0)));

    // Two phase steps, then 400 processing steps.
    world.run(401);
    let DeviceKind::Decay(d) = &device_at(&world, chamber_pos).kind else { panic!() };
    assert!(d.chamber.output.is_slot_empty(0));

    world.step();
    let DeviceKind::Decay(d) = &device_at(&world, chamber_pos).kind else { panic!() };
    let biomass = world.registry().item_id("entropy_biomass").unwrap();
    assert_eq!(d.chamber.output.quantity_of(biomass), 20);

    let events = world.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::DecayCompleted { deposited: 20, step: 402, .. }
    )));

    // One more step clears the chamber for the next subject.
    world.step();
    let DeviceKind::Decay(d) = &device_at(&world, chamber_pos).kind else { panic!() };
    assert!(d.chamber.subject.is_none());
    assert!(world.accept_subject(chamber_pos, keeper, vec![1], fx(2.0)));
}

#[test]
fn capture_requires_structure_and_respects_cooldown() {
    let tunables = Tunables {
        capture_cooldown: 50,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    let chamber = type_id(&world, "decay_chamber");

    // No casing: capture refused, cooldown untouched.
    let bare_pos = origin();
    world.add_device(bare_pos, Face::North, chamber).expect("chamber");
    assert!(!world.accept_subject(bare_pos, ActorId(1), vec![], fx(10.0)));

    // A valid chamber accepts, then the same actor is rate-limited on a
    // second chamber until the cooldown elapses.
    let good_pos = GridPos::new(10, 0, 0);
    world.add_device(good_pos, Face::North, chamber).expect("chamber");
    build_chamber_casing(&mut world, good_pos);
    let other_pos = GridPos::new(20, 0, 0);
    world.add_device(other_pos, Face::North, chamber).expect("chamber");
    build_chamber_casing(&mut world, other_pos);

    assert!(world.accept_subject(good_pos, ActorId(1), vec![], fx(10.0)));
    assert!(!world.accept_subject(other_pos, ActorId(1), vec![], fx(10.0)));
    // A different actor is unaffected.
    assert!(world.accept_subject(other_pos, ActorId(2), vec![], fx(10.0)));
}

// ---------------------------------------------------------------------------
// Conduits and reservoirs
// ---------------------------------------------------------------------------

#[test]
fn conduit_moves_charge_between_cells() {
    let tunables = Tunables {
        conduit_rate: 500,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    let cell = type_id(&world, "cell");
    let duct = type_id(&world, "duct");

    let a = origin();
    let b = GridPos::new(2, 0, 0);
    world.add_device(a, Face::North, cell).expect("cell a");
    world.add_device(GridPos::new(1, 0, 0), Face::North, duct).expect("duct");
    world.add_device(b, Face::North, cell).expect("cell b");
    fill_reservoir(&mut world, a, 10_000);

    world.device_at_mut(a).unwrap().side_config = SideConfig::uniform(SideMode::Output);
    world.device_at_mut(b).unwrap().side_config = SideConfig::uniform(SideMode::Input);

    world.run(5);
    assert_eq!(reservoir_quantity(&world, a), 7_500);
    assert_eq!(reservoir_quantity(&world, b), 2_500);

    let events = world.drain_events();
    let moved: u32 = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::TransferCommitted { kind: ResourceKind::Charge, amount, .. } => Some(*amount),
            _ => None,
        })
        .sum();
    assert_eq!(moved, 2_500);
}

#[test]
fn reservoir_charges_docked_item() {
    let tunables = Tunables {
        reservoir_charge_rate: 1_000,
        ..Tunables::default()
    };
    let mut world = world_with(tunables);
    let cell = type_id(&world, "cell");
    world.add_device(origin(), Face::North, cell).expect("cell");
    fill_reservoir(&mut world, origin(), 5_000);

    let eye = world.registry().item_id("charged_eye").unwrap();
    {
        let device = world.device_at_mut(origin()).unwrap();
        let DeviceKind::Reservoir(r) = &mut device.kind else { panic!() };
        let _ = r.dock.insert(0, ItemStack::with_charge(eye, 1, 0), false);
    }

    world.run(3);
    let DeviceKind::Reservoir(r) = &device_at(&world, origin()).kind else { panic!() };
    assert_eq!(r.dock.stack_in(0).unwrap().charge, Some(3_000));
    assert_eq!(r.store.quantity(), 2_000);

    // Drained store stops charging; the payload never exceeds the source.
    world.run(10);
    let DeviceKind::Reservoir(r) = &device_at(&world, origin()).kind else { panic!() };
    assert_eq!(r.dock.stack_in(0).unwrap().charge, Some(5_000));
    assert_eq!(r.store.quantity(), 0);
}

// ---------------------------------------------------------------------------
// Transient absence
// ---------------------------------------------------------------------------

#[test]
fn unloaded_neighbor_is_no_sink_this_step() {
    let mut world = basic_world();
    place_generator_with_fuel(&mut world, origin(), 2);
    let fuser_pos = origin().offset(Face::East);
    place_fuser(&mut world, fuser_pos, 4, 0);
    world.set_loaded(fuser_pos, false);

    world.run(5);
    // All generated charge stayed home; the neighbor was never touched.
    let DeviceKind::Converter(c) = &device_at(&world, fuser_pos).kind else { panic!() };
    assert_eq!(c.energy.container.quantity(), 0);
    assert!(generator_charge(&world, origin()) > 0);

    world.set_loaded(fuser_pos, true);
    world.step();
    let DeviceKind::Converter(c) = &device_at(&world, fuser_pos).kind else { panic!() };
    assert!(c.energy.container.quantity() > 0);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn snapshot_round_trip_is_field_for_field() {
    let mut world = production_line_world();
    world.run(33);

    let data = world.snapshot().expect("snapshot");
    let restored = World::restore(&data, basic_registry(), Tunables::default()).expect("restore");

    assert_eq!(restored.current_step(), world.current_step());
    assert_eq!(restored.state_hash(), world.state_hash());

    // Re-serializing the restored world reproduces the exact bytes.
    let data2 = restored.snapshot().expect("second snapshot");
    assert_eq!(data, data2);
}

#[test]
fn restored_world_continues_identically() {
    let mut world = production_line_world();
    world.run(20);
    let data = world.snapshot().expect("snapshot");
    let mut restored = World::restore(&data, basic_registry(), Tunables::default()).expect("restore");

    for _ in 0..30 {
        world.step();
        restored.step();
        assert_eq!(world.state_hash(), restored.state_hash());
    }
}

#[test]
fn corrupt_record_values_are_clamped_on_load() {
    let mut world = basic_world();
    let chamber = type_id(&world, "decay_chamber");
    world.add_device(origin(), Face::North, chamber).expect("chamber");

    let mut record = device_to_record(device_at(&world, origin()));
    record.decay_phase = 9;
    record.decay_progress = 123;
    record.decay_duration = 45;
    record.side_modes = [200, 1, 2, 3, 0, 1];

    let device = world.device_at_mut(origin()).unwrap();
    apply_record(device, &record, basic_registry_ref());

    // Invalid phase collapses to Empty with a full reset.
    let DeviceKind::Decay(d) = &device.kind else { panic!() };
    assert_eq!(d.chamber.progress, 0);
    assert_eq!(d.chamber.duration, 0);
    assert!(d.chamber.subject.is_none());
    assert_eq!(
        device.side_config.mode(entropic_core::grid::RelativeSide::Front),
        SideMode::None
    );
}

// Registry borrowed fresh for apply_record in the corruption test.
fn basic_registry_ref() -> &'static entropic_core::registry::Registry {
    use std::sync::OnceLock;
    static REGISTRY: OnceLock<entropic_core::registry::Registry> = OnceLock::new();
    REGISTRY.get_or_init(basic_registry)
}
