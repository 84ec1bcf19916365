//! Entropic Core -- a tick-driven device-simulation framework for
//! block-grid worlds.
//!
//! Devices are storage/conversion machines on an integer grid: they hold
//! energy-like and entropy-like resources in bounded containers, run timed
//! processes, move resources across adjacency links, and broadcast rate
//! boosts to nearby peers.
//!
//! # Per-Step Pipeline
//!
//! [`world::World::step`] advances every device exactly once, in insertion
//! order, with the stepping device detached from the map so all
//! cross-device interaction goes through the world. A processing device
//! runs a fixed component order per step:
//!
//! 1. **Ignite** -- consume one fuel unit, only when it would be used.
//! 2. **Process** -- advance or reset progress against the process contract.
//! 3. **Burn** -- tick the active fuel countdown.
//! 4. **Push** -- auto-push output slots to neighbors on the fixed interval.
//!
//! # Key Types
//!
//! - [`container::ResourceContainer`] -- bounded store with per-operation
//!   transfer caps and simulate/commit semantics.
//! - [`transfer::transfer`] -- simulate-then-commit movement between two
//!   containers; aborts rather than partially applying.
//! - [`process::ProcessContract`] -- per-device-type processing definition,
//!   arbitrated by [`process::step_process`].
//! - [`access::SlotAccessRules`] -- per-slot, per-face automation gating.
//! - [`boost::BoostState`] -- highest-wins rate boost with expiry decay.
//! - [`decay::DecayChamber`] -- the capture/decay/yield state machine.
//! - [`registry::Registry`] -- immutable content and service-accessor
//!   tables, frozen at startup.
//! - [`world::World`] -- the grid, the step loop, and versioned snapshots
//!   (see [`serialize`]).

pub mod access;
pub mod automation;
pub mod boost;
pub mod config;
pub mod container;
pub mod cooldown;
pub mod decay;
pub mod device;
pub mod event;
pub mod fixed;
pub mod grid;
pub mod id;
pub mod item;
pub mod process;
pub mod registry;
pub mod serialize;
pub mod sim;
pub mod transfer;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
