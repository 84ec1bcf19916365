//! The grid world: device placement, the step loop, and cross-device
//! services.
//!
//! # Scheduling
//!
//! `World::step` advances every device exactly once, in insertion order.
//! The stepping device is detached from the device map for the duration of
//! its step, so every cross-device interaction goes through the world and
//! a missing or unloaded neighbor is simply "no sink/source this step".
//! Nothing spans steps: a transaction either commits before the device's
//! step returns or is abandoned.
//!
//! # Per-device order
//!
//! Processing devices follow a fixed component order per step: try to
//! ignite fuel, advance the process, tick the burn, then auto-push
//! outputs. Movers (reservoirs, conduits) and the boost/decay devices run
//! their own fixed sequences. The order is part of the observable
//! behavior and is pinned by tests.

use crate::access::SidedRules;
use crate::automation::Automation;
use crate::boost::{clamp_multiplier, validate_tier, AmplifierTier, MAX_SCAN_RADIUS};
use crate::config::Tunables;
use crate::container::{ResourceContainer, ResourceKind};
use crate::cooldown::CooldownCache;
use crate::decay::{chamber_structure_valid, DecayChamber, DecayOutcome, DecayPhase, SubjectSnapshot};
use crate::device::{
    Amplifier, Conduit, Converter, DecayDevice, Device, DeviceKind, Generator, Locker, Recipe,
    RecipeProcess, Reservoir, SLOT_LIMIT,
};
use crate::access::SlotRoles;
use crate::event::{EventLog, HaltReason, SimEvent};
use crate::fixed::{boost_scale, Fixed64, Steps};
use crate::grid::{Face, GridPos};
use crate::id::{ActorId, DeviceId, DeviceTypeId};
use crate::item::{Inventory, ItemStack};
use crate::process::{should_ignite, step_process, EnergyCore, FuelState, ProcessOutcome, ProcessState};
use crate::registry::{DeviceSpec, Registry, ServiceKind};
use crate::sim::StateHash;
use crate::transfer::{transfer, TransferResult};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, HashSet};

/// Default event log capacity.
const EVENT_LOG_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The simulated grid: devices, structural casing, and loaded regions.
#[derive(Debug)]
pub struct World {
    ids: SlotMap<DeviceId, ()>,
    devices: SecondaryMap<DeviceId, Device>,
    /// Step order. Host-defined (insertion order) and deterministic.
    order: Vec<DeviceId>,
    by_pos: HashMap<GridPos, DeviceId>,
    casing: HashSet<GridPos>,
    /// Positions explicitly marked unavailable. Everything else is loaded.
    unloaded: HashSet<GridPos>,
    registry: Registry,
    tunables: Tunables,
    events: EventLog,
    cooldowns: CooldownCache,
    step: Steps,
}

impl World {
    /// Create a world. The tunables are normalized here: out-of-range
    /// values clamp to their nearest bound and each adjustment is recorded
    /// once as a [`SimEvent::ConfigClamped`].
    pub fn new(registry: Registry, tunables: Tunables) -> Self {
        let (tunables, adjusted) = tunables.clamped();
        let mut events = EventLog::new(EVENT_LOG_CAPACITY);
        for field in adjusted {
            events.record(SimEvent::ConfigClamped { field, step: 0 });
        }
        let cooldowns = CooldownCache::new(
            tunables.cooldown_cache_capacity as usize,
            tunables.cooldown_cache_ttl as Steps,
        );
        Self {
            ids: SlotMap::with_key(),
            devices: SecondaryMap::new(),
            order: Vec::new(),
            by_pos: HashMap::new(),
            casing: HashSet::new(),
            unloaded: HashSet::new(),
            registry,
            tunables,
            events,
            cooldowns,
            step: 0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn current_step(&self) -> Steps {
        self.step
    }

    pub fn device_count(&self) -> usize {
        self.order.len()
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    pub fn is_loaded(&self, pos: GridPos) -> bool {
        !self.unloaded.contains(&pos)
    }

    /// Mark a position (un)available. Unloaded devices neither step nor
    /// serve neighbors; they resume untouched when reloaded.
    pub fn set_loaded(&mut self, pos: GridPos, loaded: bool) {
        if loaded {
            self.unloaded.remove(&pos);
        } else {
            self.unloaded.insert(pos);
        }
    }

    fn is_casing(&self, pos: GridPos) -> bool {
        self.is_loaded(pos) && self.casing.contains(&pos)
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place structural casing. Fails on an occupied cell.
    pub fn add_casing(&mut self, pos: GridPos) -> bool {
        if self.by_pos.contains_key(&pos) {
            return false;
        }
        self.casing.insert(pos)
    }

    pub fn remove_casing(&mut self, pos: GridPos) -> bool {
        self.casing.remove(&pos)
    }

    /// Place a device of a registered type. Fails on an occupied cell or
    /// an unknown type.
    pub fn add_device(
        &mut self,
        pos: GridPos,
        facing: Face,
        device_type: DeviceTypeId,
    ) -> Option<DeviceId> {
        if self.by_pos.contains_key(&pos) || self.casing.contains(&pos) {
            return None;
        }
        let device = self.build_device(device_type, pos, facing)?;
        let id = self.ids.insert(());
        self.devices.insert(id, device);
        self.order.push(id);
        self.by_pos.insert(pos, id);
        Some(id)
    }

    /// Remove the device at `pos`. Its pending state simply stops being
    /// stepped; there is no cancellation protocol.
    pub fn remove_device(&mut self, pos: GridPos) -> bool {
        let Some(id) = self.by_pos.remove(&pos) else {
            return false;
        };
        self.devices.remove(id);
        self.ids.remove(id);
        self.order.retain(|&d| d != id);
        true
    }

    pub fn device_id_at(&self, pos: GridPos) -> Option<DeviceId> {
        self.by_pos.get(&pos).copied()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn device_at(&self, pos: GridPos) -> Option<&Device> {
        self.devices.get(self.device_id_at(pos)?)
    }

    pub fn device_at_mut(&mut self, pos: GridPos) -> Option<&mut Device> {
        let id = self.device_id_at(pos)?;
        self.devices.get_mut(id)
    }

    // -----------------------------------------------------------------------
    // Device construction
    // -----------------------------------------------------------------------

    fn build_device(&self, device_type: DeviceTypeId, pos: GridPos, facing: Face) -> Option<Device> {
        let spec = self.registry.get_device(device_type)?.spec.clone();
        let t = &self.tunables;
        let kind = match spec {
            DeviceSpec::Converter { recipe, fuel_item } => {
                let def = self.registry.get_recipe(recipe)?;
                let recipe = Recipe {
                    input: def.input,
                    input_count: def.input_count,
                    output: def.output,
                    output_count: def.output_count,
                    duration: t.converter_duration,
                    step_cost: t.converter_step_cost,
                };
                let roles = SlotRoles {
                    input_slots: vec![Converter::INPUT_SLOT],
                    output_slots: vec![Converter::OUTPUT_SLOT],
                    fuel_slot: Some(Converter::FUEL_SLOT),
                    allowed: vec![Some(recipe.input), Some(fuel_item), None],
                };
                DeviceKind::Converter(Converter {
                    // Accepts charge from neighbors, never exports it.
                    energy: EnergyCore::new(ResourceContainer::new(
                        t.converter_capacity,
                        0,
                        0,
                        true,
                        false,
                    )),
                    inventory: Inventory::new(3, SLOT_LIMIT),
                    process: ProcessState::new(),
                    automation: Automation::new(),
                    roles,
                    recipe,
                })
            }
            DeviceSpec::Generator { fuel_item } => DeviceKind::Generator(Generator {
                // Export-only buffer; generation uses the internal path.
                output: ResourceContainer::new(t.generator_capacity, 0, 0, false, true),
                inventory: Inventory::new(1, SLOT_LIMIT),
                fuel: FuelState::new(),
                boost: Default::default(),
                roles: SlotRoles {
                    input_slots: vec![],
                    output_slots: vec![],
                    fuel_slot: Some(Generator::FUEL_SLOT),
                    allowed: vec![Some(fuel_item)],
                },
                base_rate: t.generator_base_rate,
                push_rate: t.generator_push_rate,
            }),
            DeviceSpec::Reservoir { kind } => DeviceKind::Reservoir(Reservoir {
                kind,
                store: ResourceContainer::buffer(t.reservoir_capacity),
                dock: Inventory::new(1, 1),
                roles: SlotRoles {
                    input_slots: vec![Reservoir::DOCK_SLOT],
                    output_slots: vec![Reservoir::DOCK_SLOT],
                    fuel_slot: None,
                    allowed: vec![None],
                },
                push_rate: t.reservoir_push_rate,
                charge_rate: t.reservoir_charge_rate,
            }),
            DeviceSpec::Conduit { kind } => DeviceKind::Conduit(Conduit {
                kind,
                rate: t.conduit_rate,
            }),
            DeviceSpec::Amplifier => DeviceKind::Amplifier(Amplifier {
                state: Default::default(),
                scan_interval: t.amplifier_scan_interval,
            }),
            DeviceSpec::Decay { yield_item } => DeviceKind::Decay(DecayDevice {
                chamber: DecayChamber::new(yield_item, SLOT_LIMIT),
                roles: SlotRoles {
                    input_slots: vec![],
                    output_slots: vec![DecayChamber::OUTPUT_SLOT],
                    fuel_slot: None,
                    allowed: vec![None],
                },
            }),
            DeviceSpec::Locker { slots } => {
                let slots = slots.clamp(1, 64) as usize;
                DeviceKind::Locker(Locker {
                    inventory: Inventory::new(slots, SLOT_LIMIT),
                    roles: SlotRoles {
                        input_slots: (0..slots).collect(),
                        output_slots: (0..slots).collect(),
                        fuel_slot: None,
                        allowed: vec![None; slots],
                    },
                })
            }
        };
        let side_config = Device::default_side_config(&kind);
        Some(Device {
            pos,
            facing,
            device_type,
            side_config,
            kind,
        })
    }

    // -----------------------------------------------------------------------
    // Step loop
    // -----------------------------------------------------------------------

    /// Advance the whole world by one step.
    pub fn step(&mut self) {
        let step = self.step + 1;
        let order = self.order.clone();
        for id in order {
            let Some(mut device) = self.devices.remove(id) else {
                continue;
            };
            if self.is_loaded(device.pos) {
                self.step_device(&mut device, step);
            }
            self.devices.insert(id, device);
        }
        self.step = step;
    }

    /// Advance `n` steps.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    fn step_device(&mut self, device: &mut Device, step: Steps) {
        let pos = device.pos;
        let facing = device.facing;
        match &mut device.kind {
            DeviceKind::Converter(c) => {
                let interval = self.tunables.auto_push_interval;
                let mut process = RecipeProcess { recipe: &c.recipe };

                // 1. Ignite fuel only when it would actually be used.
                if should_ignite(&process, &c.energy, &c.inventory) {
                    let burn = c.energy.try_ignite(&mut c.inventory, Converter::FUEL_SLOT, |item| {
                        self.registry.fuel_value(item)
                    });
                    if let Some(burn_steps) = burn {
                        self.events.record(SimEvent::FuelIgnited { pos, burn_steps, step });
                    }
                }

                // 2. Advance the process.
                let was_processing = c.process.is_processing();
                match step_process(&mut c.process, &mut process, &mut c.energy, &mut c.inventory) {
                    ProcessOutcome::Completed => {
                        self.events.record(SimEvent::ProcessCompleted { pos, step });
                    }
                    ProcessOutcome::NoPower if was_processing => {
                        self.events.record(SimEvent::ProcessHalted {
                            pos,
                            reason: HaltReason::NoPower,
                            step,
                        });
                    }
                    ProcessOutcome::Idle if was_processing => {
                        self.events.record(SimEvent::ProcessHalted {
                            pos,
                            reason: HaltReason::CannotProcess,
                            step,
                        });
                    }
                    _ => {}
                }

                // 3. Tick the burn.
                c.energy.fuel.tick();

                // 4. Auto-push outputs on the fixed interval.
                if c.automation.due(interval) {
                    let rules = SidedRules {
                        roles: &c.roles,
                        config: &device.side_config,
                    };
                    let pushed = Automation::push_outputs(
                        &rules,
                        &mut c.inventory,
                        &c.roles.output_slots,
                        facing,
                        |face, stack| self.offer_items(pos.offset(face), face.opposite(), stack),
                    );
                    for p in pushed {
                        self.events.record(SimEvent::ItemsPushed {
                            from: pos,
                            to: pos.offset(p.face),
                            item_type: p.item_type,
                            quantity: p.quantity,
                            step,
                        });
                    }
                }
            }

            DeviceKind::Generator(g) => {
                // 1. Boost expiry countdown.
                if g.boost.tick() {
                    self.events.record(SimEvent::BoostExpired { pos, step });
                }

                // 2. Ignite when idle and there is room to generate into.
                if !g.fuel.burning() && !g.output.is_full() {
                    let fuel_steps = g
                        .inventory
                        .stack_in(Generator::FUEL_SLOT)
                        .map(|s| self.registry.fuel_value(s.item_type))
                        .unwrap_or(0);
                    if fuel_steps > 0 && g.inventory.extract(Generator::FUEL_SLOT, 1, false).is_some() {
                        g.fuel.ignite(fuel_steps);
                        self.events.record(SimEvent::FuelIgnited {
                            pos,
                            burn_steps: fuel_steps,
                            step,
                        });
                    }
                }

                // 3. Generate while burning, scaled by the received boost.
                if g.fuel.burning() {
                    let amount = boost_scale(g.base_rate, g.boost.multiplier());
                    let _ = g.output.fill_internal(amount);
                    g.fuel.tick();
                }

                // 4. Push charge through output-enabled faces.
                let push_rate = g.push_rate;
                for face in Face::ALL {
                    if !device.side_config.allows_output_to(face, facing) {
                        continue;
                    }
                    let npos = pos.offset(face);
                    let result = self.push_resource_to(
                        npos,
                        face.opposite(),
                        ResourceKind::Charge,
                        &mut g.output,
                    push_rate,
                    );
                    if let TransferResult::Committed(amount) = result {
                        self.events.record(SimEvent::TransferCommitted {
                            kind: ResourceKind::Charge,
                            from: pos,
                            to: npos,
                            amount,
                            step,
                        });
                    }
                }
            }

            DeviceKind::Reservoir(r) => {
                // 1. Charge the docked item's per-unit payload.
                if let Some(stack) = r.dock.stack_in_mut(Reservoir::DOCK_SLOT) {
                    if let Some(capacity) = self.registry.charge_capacity(stack.item_type) {
                        let current = stack.charge.unwrap_or(0);
                        let want = capacity.saturating_sub(current).min(r.charge_rate);
                        if want > 0 {
                            let available = r.store.extract(want, true);
                            if available > 0 {
                                let moved = r.store.extract(available, false);
                                stack.charge = Some(current + moved);
                            }
                        }
                    }
                }

                // 2. Push the stored resource through output-enabled faces.
                let (kind, push_rate) = (r.kind, r.push_rate);
                for face in Face::ALL {
                    if !device.side_config.allows_output_to(face, facing) {
                        continue;
                    }
                    let npos = pos.offset(face);
                    let result =
                        self.push_resource_to(npos, face.opposite(), kind, &mut r.store, push_rate);
                    if let TransferResult::Committed(amount) = result {
                        self.events.record(SimEvent::TransferCommitted {
                            kind,
                            from: pos,
                            to: npos,
                            amount,
                            step,
                        });
                    }
                }
            }

            DeviceKind::Conduit(c) => {
                let (kind, rate) = (c.kind, c.rate);
                self.conduit_pass(pos, kind, rate, step);
            }

            DeviceKind::Amplifier(a) => {
                if a.state.scan_due(a.scan_interval) {
                    let tier = validate_tier(pos, |p| self.is_casing(p));
                    if tier != a.state.tier {
                        a.state.tier = tier;
                        self.events.record(SimEvent::TierChanged { pos, tier, step });
                    }
                    if tier != AmplifierTier::None {
                        let radius = tier.scan_radius();
                        // An out-of-range radius is corrupt config: skip the scan.
                        if (1..=MAX_SCAN_RADIUS).contains(&radius) {
                            let multiplier = clamp_multiplier(tier.multiplier());
                            self.broadcast_boost(pos, radius, multiplier, step);
                        }
                    }
                }
            }

            DeviceKind::Decay(dc) => {
                let structure_ok = chamber_structure_valid(pos, |p| self.is_casing(p));
                match dc.chamber.step(structure_ok, self.tunables.decay_yield_rate) {
                    DecayOutcome::PhaseChanged(phase) => {
                        self.events.record(SimEvent::DecayPhaseChanged { pos, phase, step });
                    }
                    DecayOutcome::Completed { deposited } => {
                        self.events.record(SimEvent::DecayCompleted { pos, deposited, step });
                    }
                    DecayOutcome::Held | DecayOutcome::Progressed => {}
                }
            }

            // Passive storage has no per-step behavior.
            DeviceKind::Locker(_) => {}
        }
    }

    // -----------------------------------------------------------------------
    // Cross-device services
    // -----------------------------------------------------------------------

    /// Whether the device at `pos` offers `kind` through `face` right now.
    /// Absence (unloaded region, no device, no capability) is a normal
    /// answer, never an error.
    pub fn service_available(&self, kind: ServiceKind, pos: GridPos, face: Face) -> bool {
        if !self.is_loaded(pos) {
            return false;
        }
        let Some(device) = self.device_at(pos) else {
            return false;
        };
        let open = device.side_config.mode_for(face, device.facing) != crate::grid::SideMode::None;
        match kind {
            ServiceKind::Resource(k) => {
                open && self.registry.resource_accessor(device.device_type, k).is_some()
            }
            ServiceKind::Items => open && self.registry.item_accessor(device.device_type).is_some(),
            ServiceKind::Boost => self.registry.boost_accessor(device.device_type).is_some(),
        }
    }

    /// Offer a stack to the device at `pos` through `face_into` (the face
    /// of the receiving device). `None` means no sink there this step;
    /// otherwise the un-accepted remainder is returned.
    fn offer_items(
        &mut self,
        pos: GridPos,
        face_into: Face,
        stack: ItemStack,
    ) -> Option<Option<ItemStack>> {
        if !self.is_loaded(pos) {
            return None;
        }
        let id = self.device_id_at(pos)?;
        let device = self.devices.get_mut(id)?;
        let accessor = self.registry.item_accessor(device.device_type)?;
        let mut port = accessor(device)?;
        Some(port.insert_from(face_into, stack))
    }

    /// Push from an external container into the device at `pos` through
    /// `face_into`, honoring the receiver's side configuration.
    fn push_resource_to(
        &mut self,
        pos: GridPos,
        face_into: Face,
        kind: ResourceKind,
        source: &mut ResourceContainer,
        max_amount: u32,
    ) -> TransferResult {
        if !self.is_loaded(pos) {
            return TransferResult::Failed;
        }
        let Some(id) = self.device_id_at(pos) else {
            return TransferResult::Failed;
        };
        let Some(device) = self.devices.get_mut(id) else {
            return TransferResult::Failed;
        };
        if !device.side_config.allows_input_from(face_into, device.facing) {
            return TransferResult::Failed;
        }
        let Some(accessor) = self.registry.resource_accessor(device.device_type, kind) else {
            return TransferResult::Failed;
        };
        let Some(target) = accessor(device) else {
            return TransferResult::Failed;
        };
        transfer(source, target, max_amount)
    }

    /// One conduit pass: pair every extract-capable neighbor with every
    /// insert-capable neighbor in fixed face order. One source may feed
    /// several destinations in one step.
    fn conduit_pass(&mut self, pos: GridPos, kind: ResourceKind, rate: u32, step: Steps) {
        for source_face in Face::ALL {
            let spos = pos.offset(source_face);
            if !self.is_loaded(spos) {
                continue;
            }
            let Some(&sid) = self.by_pos.get(&spos) else {
                continue;
            };
            for dest_face in Face::ALL {
                if dest_face == source_face {
                    continue;
                }
                let dpos = pos.offset(dest_face);
                if !self.is_loaded(dpos) {
                    continue;
                }
                let Some(&did) = self.by_pos.get(&dpos) else {
                    continue;
                };
                if did == sid {
                    continue;
                }
                let Some([src_dev, dst_dev]) = self.devices.get_disjoint_mut([sid, did]) else {
                    continue;
                };
                // Side gating on both endpoints, from their own point of view.
                if !src_dev
                    .side_config
                    .allows_output_to(source_face.opposite(), src_dev.facing)
                {
                    continue;
                }
                if !dst_dev
                    .side_config
                    .allows_input_from(dest_face.opposite(), dst_dev.facing)
                {
                    continue;
                }
                let Some(src_acc) = self.registry.resource_accessor(src_dev.device_type, kind)
                else {
                    continue;
                };
                let Some(dst_acc) = self.registry.resource_accessor(dst_dev.device_type, kind)
                else {
                    continue;
                };
                let Some(source) = src_acc(src_dev) else {
                    continue;
                };
                let Some(dest) = dst_acc(dst_dev) else {
                    continue;
                };
                if let TransferResult::Committed(amount) = transfer(source, dest, rate) {
                    self.events.record(SimEvent::TransferCommitted {
                        kind,
                        from: spos,
                        to: dpos,
                        amount,
                        step,
                    });
                }
            }
        }
    }

    /// Broadcast a boost to every receiver within the cube radius.
    fn broadcast_boost(&mut self, center: GridPos, radius: u32, multiplier: Fixed64, step: Steps) {
        let expiry = self.tunables.boost_expiry_steps;
        for index in 0..self.order.len() {
            let id = self.order[index];
            let Some((pos, device_type)) = self.devices.get(id).map(|d| (d.pos, d.device_type))
            else {
                continue;
            };
            if pos == center || pos.chebyshev(center) > radius || !self.is_loaded(pos) {
                continue;
            }
            let Some(accessor) = self.registry.boost_accessor(device_type) else {
                continue;
            };
            let Some(device) = self.devices.get_mut(id) else {
                continue;
            };
            let Some(boost) = accessor(device) else {
                continue;
            };
            if boost.set_boost(multiplier, expiry) {
                self.events.record(SimEvent::BoostApplied {
                    source: center,
                    receiver: pos,
                    multiplier,
                    step,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // External operations
    // -----------------------------------------------------------------------

    /// Hand a captured subject to the decay chamber at `pos`. Rate-limited
    /// per actor; requires an empty chamber and a valid structure.
    pub fn accept_subject(
        &mut self,
        pos: GridPos,
        actor: ActorId,
        payload: Vec<u8>,
        metric: Fixed64,
    ) -> bool {
        if !self.is_loaded(pos) {
            return false;
        }
        let Some(id) = self.device_id_at(pos) else {
            return false;
        };
        let structure_ok = chamber_structure_valid(pos, |p| self.is_casing(p));
        let now = self.step;
        let cooldown = self.tunables.capture_cooldown as Steps;
        let steps_per_unit = self.tunables.decay_steps_per_unit;
        let min_duration = self.tunables.decay_min_duration;

        let Some(device) = self.devices.get_mut(id) else {
            return false;
        };
        let DeviceKind::Decay(dc) = &mut device.kind else {
            return false;
        };
        if dc.chamber.phase != DecayPhase::Empty || !structure_ok {
            return false;
        }
        if !self.cooldowns.try_activate(actor, now, cooldown) {
            return false;
        }
        dc.chamber.accept_subject(
            SubjectSnapshot { payload, metric },
            steps_per_unit,
            min_duration,
            true,
        )
    }

    // -----------------------------------------------------------------------
    // Observability
    // -----------------------------------------------------------------------

    /// Drain all buffered simulation events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Deterministic hash of the observable world state.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.step);
        for &id in &self.order {
            if let Some(device) = self.devices.get(id) {
                device.hash_into(&mut h);
            }
        }
        let mut casing: Vec<GridPos> = self.casing.iter().copied().collect();
        casing.sort();
        for p in casing {
            h.write_i32(p.x);
            h.write_i32(p.y);
            h.write_i32(p.z);
        }
        h.finish()
    }

    // -----------------------------------------------------------------------
    // Snapshot plumbing (used by the serialize module)
    // -----------------------------------------------------------------------

    pub(crate) fn devices_in_order(&self) -> impl Iterator<Item = &Device> {
        self.order.iter().filter_map(|&id| self.devices.get(id))
    }

    pub(crate) fn casing_sorted(&self) -> Vec<GridPos> {
        let mut casing: Vec<GridPos> = self.casing.iter().copied().collect();
        casing.sort();
        casing
    }

    pub(crate) fn unloaded_sorted(&self) -> Vec<GridPos> {
        let mut unloaded: Vec<GridPos> = self.unloaded.iter().copied().collect();
        unloaded.sort();
        unloaded
    }

    pub(crate) fn restore_step(&mut self, step: Steps) {
        self.step = step;
    }

    /// Apply a persisted record to the device at `pos`, validating item
    /// references against the registry.
    pub(crate) fn apply_device_record(&mut self, pos: GridPos, record: &crate::serialize::DeviceRecord) {
        let Some(id) = self.device_id_at(pos) else {
            return;
        };
        if let Some(device) = self.devices.get_mut(id) {
            crate::serialize::apply_record(device, record, &self.registry);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
