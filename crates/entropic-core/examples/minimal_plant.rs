//! Minimal plant: a fueled turbine powering a fuser, with a locker
//! catching the output.
//!
//! Run with: `cargo run --example minimal_plant --features test-utils`

use entropic_core::device::{Converter, DeviceKind};
use entropic_core::event::SimEvent;
use entropic_core::grid::{Face, GridPos};
use entropic_core::item::ItemStack;
use entropic_core::test_utils::*;

fn main() {
    let mut world = basic_world();

    // Turbine -> fuser -> locker, west to east.
    let turbine_pos = GridPos::new(0, 0, 0);
    let fuser_pos = GridPos::new(1, 0, 0);
    let locker_pos = GridPos::new(2, 0, 0);

    place_generator_with_fuel(&mut world, turbine_pos, 4);
    world
        .add_device(fuser_pos, Face::North, type_id(&world, "fuser"))
        .expect("fuser placement");
    world
        .add_device(locker_pos, Face::North, type_id(&world, "locker"))
        .expect("locker placement");

    // Load raw crystals and open the fuser's east side for pushing.
    let crystal = world.registry().item_id("flux_crystal").expect("crystal item");
    {
        let device = world.device_at_mut(fuser_pos).expect("fuser");
        device
            .side_config
            .set_mode(entropic_core::grid::RelativeSide::Right, entropic_core::grid::SideMode::Output);
        let DeviceKind::Converter(c) = &mut device.kind else {
            unreachable!("fuser is a converter");
        };
        let _ = c
            .inventory
            .insert(Converter::INPUT_SLOT, ItemStack::new(crystal, 16), false);
    }

    // Two full crafting cycles at default timing.
    world.run(450);

    for event in world.drain_events() {
        match event {
            SimEvent::ProcessCompleted { pos, step } => {
                println!("step {step:4}: craft finished at {pos:?}");
            }
            SimEvent::ItemsPushed { to, quantity, step, .. } => {
                println!("step {step:4}: pushed {quantity} items to {to:?}");
            }
            _ => {}
        }
    }

    let alloy = world.registry().item_id("stable_alloy").expect("alloy item");
    let DeviceKind::Locker(l) = &device_at(&world, locker_pos).kind else {
        unreachable!("locker");
    };
    println!("locker holds {} alloy", l.inventory.quantity_of(alloy));
}
