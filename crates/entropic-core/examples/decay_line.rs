//! Decay line: capture a subject, watch the chamber work through its
//! phases, and read out the biomass yield.
//!
//! Run with: `cargo run --example decay_line --features test-utils`

use entropic_core::device::DeviceKind;
use entropic_core::event::SimEvent;
use entropic_core::grid::{Face, GridPos};
use entropic_core::id::ActorId;
use entropic_core::test_utils::*;

fn main() {
    let mut world = basic_world();
    let chamber_pos = GridPos::new(0, 0, 0);
    world
        .add_device(chamber_pos, Face::North, type_id(&world, "decay_chamber"))
        .expect("chamber placement");
    build_chamber_casing(&mut world, chamber_pos);

    // A subject with metric 40: at the default 10 steps per unit that is
    // a 400-step decay.
    let accepted = world.accept_subject(chamber_pos, ActorId(1), vec![0xAB; 32], fx(40.0));
    println!("subject accepted: {accepted}");

    world.run(410);

    for event in world.drain_events() {
        match event {
            SimEvent::DecayPhaseChanged { phase, step, .. } => {
                println!("step {step:4}: phase -> {phase:?}");
            }
            SimEvent::DecayCompleted { deposited, step, .. } => {
                println!("step {step:4}: decay complete, {deposited} biomass deposited");
            }
            _ => {}
        }
    }

    let biomass = world.registry().item_id("entropy_biomass").expect("biomass item");
    let DeviceKind::Decay(d) = &device_at(&world, chamber_pos).kind else {
        unreachable!("chamber");
    };
    println!(
        "chamber output: {} biomass, phase {:?}",
        d.chamber.output.quantity_of(biomass),
        d.chamber.phase
    );
}
