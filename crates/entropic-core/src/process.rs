//! The per-step processing engine: progress, fuel, and power arbitration.
//!
//! A device type defines its crafting behavior through [`ProcessContract`];
//! the engine itself only arbitrates whether a step may advance. Power is
//! hybrid: the primary resource container is checked strictly first, and an
//! active fuel burn substitutes only when the container alone cannot cover
//! the step cost. Fuel is never consumed speculatively -- ignition is
//! attempted only when there is no active burn, the container is short, and
//! a process could actually run.

use crate::container::ResourceContainer;
use crate::item::Inventory;
use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// Process contract
// ---------------------------------------------------------------------------

/// Per-device-type definition of when processing may run, how long it
/// takes, and what each step costs.
pub trait ProcessContract {
    /// Whether a processing cycle could run right now (inputs present,
    /// output space available).
    fn can_process(&self, inventory: &Inventory) -> bool;

    /// Consume inputs and emit outputs. Called exactly once when progress
    /// reaches the duration.
    fn complete(&mut self, inventory: &mut Inventory);

    /// Total steps required to complete one cycle.
    fn duration(&self) -> u32;

    /// Power cost per step while processing.
    fn step_cost(&self) -> u32;
}

// ---------------------------------------------------------------------------
// Fuel
// ---------------------------------------------------------------------------

/// Active fuel burn state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelState {
    burn_steps_remaining: u32,
    max_burn_steps: u32,
}

impl FuelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn burning(&self) -> bool {
        self.burn_steps_remaining > 0
    }

    pub fn burn_steps_remaining(&self) -> u32 {
        self.burn_steps_remaining
    }

    pub fn max_burn_steps(&self) -> u32 {
        self.max_burn_steps
    }

    /// Begin burning one fuel unit worth `steps`.
    pub fn ignite(&mut self, steps: u32) {
        self.burn_steps_remaining = steps;
        self.max_burn_steps = steps;
    }

    /// Tick down the active burn. Called once per step.
    pub fn tick(&mut self) {
        if self.burn_steps_remaining > 0 {
            self.burn_steps_remaining -= 1;
        }
    }

    /// Restore persisted values, clamping remaining to the maximum.
    pub fn restore(&mut self, remaining: u32, max: u32) {
        self.max_burn_steps = max;
        self.burn_steps_remaining = remaining.min(max);
    }
}

// ---------------------------------------------------------------------------
// Energy core
// ---------------------------------------------------------------------------

/// A device's power train: primary resource container plus fuel fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCore {
    pub container: ResourceContainer,
    pub fuel: FuelState,
}

impl EnergyCore {
    pub fn new(container: ResourceContainer) -> Self {
        Self {
            container,
            fuel: FuelState::new(),
        }
    }

    /// Whether the device currently has power: the primary container covers
    /// the cost, or an active fuel burn substitutes for it.
    pub fn has_power(&self, cost: u32) -> bool {
        self.container.quantity() >= cost || self.fuel.burning()
    }

    /// Consume one step of power. The primary container is drained first;
    /// when it cannot cover the cost an active burn carries the step and
    /// ticks down separately.
    pub fn consume(&mut self, cost: u32) {
        if self.container.quantity() >= cost {
            let _ = self.drain(cost);
        }
    }

    fn drain(&mut self, cost: u32) -> bool {
        self.container.drain_internal(cost)
    }

    /// Try to ignite one fuel unit from `fuel_slot`. `fuel_value` maps an
    /// item type to burn steps; zero means not a fuel. Returns the burn
    /// steps on success.
    pub fn try_ignite(
        &mut self,
        inventory: &mut Inventory,
        fuel_slot: usize,
        fuel_value: impl Fn(crate::id::ItemTypeId) -> u32,
    ) -> Option<u32> {
        let stack = inventory.stack_in(fuel_slot)?;
        let steps = fuel_value(stack.item_type);
        if steps == 0 {
            return None;
        }
        let _ = inventory.extract(fuel_slot, 1, false)?;
        self.fuel.ignite(steps);
        Some(steps)
    }
}

// ---------------------------------------------------------------------------
// Process state
// ---------------------------------------------------------------------------

/// Progress through the current processing cycle. No partial credit
/// survives an invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessState {
    progress: u32,
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn is_processing(&self) -> bool {
        self.progress > 0
    }

    /// Restore a persisted progress value, clamped to the duration.
    pub fn restore(&mut self, progress: u32, duration: u32) {
        self.progress = progress.min(duration);
    }

    fn reset(&mut self) {
        self.progress = 0;
    }
}

// ---------------------------------------------------------------------------
// Step arbitration
// ---------------------------------------------------------------------------

/// What one processing step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Progress advanced by one step.
    Advanced,
    /// The cycle completed this step; outputs were emitted.
    Completed,
    /// Power was unavailable; progress reset to zero.
    NoPower,
    /// No runnable process; progress reset to zero.
    Idle,
}

/// Advance or reset a device's processing by one step.
///
/// - runnable and powered: consume the step cost, advance progress, and
///   complete the cycle when the duration is reached;
/// - runnable but unpowered: reset progress;
/// - not runnable: reset progress.
pub fn step_process<P: ProcessContract>(
    state: &mut ProcessState,
    process: &mut P,
    energy: &mut EnergyCore,
    inventory: &mut Inventory,
) -> ProcessOutcome {
    if !process.can_process(inventory) {
        state.reset();
        return ProcessOutcome::Idle;
    }
    let cost = process.step_cost();
    if !energy.has_power(cost) {
        state.reset();
        return ProcessOutcome::NoPower;
    }
    energy.consume(cost);
    state.progress += 1;
    if state.progress >= process.duration().max(1) {
        process.complete(inventory);
        state.reset();
        ProcessOutcome::Completed
    } else {
        ProcessOutcome::Advanced
    }
}

/// Whether fuel ignition should even be attempted this step.
pub fn should_ignite<P: ProcessContract>(
    process: &P,
    energy: &EnergyCore,
    inventory: &Inventory,
) -> bool {
    !energy.fuel.burning()
        && !energy.has_power(process.step_cost())
        && process.can_process(inventory)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ItemTypeId;
    use crate::item::ItemStack;

    /// Minimal contract: always runnable until `completions` hits a cap.
    struct CountingProcess {
        duration: u32,
        cost: u32,
        runnable: bool,
        completions: u32,
    }

    impl CountingProcess {
        fn new(duration: u32, cost: u32) -> Self {
            Self {
                duration,
                cost,
                runnable: true,
                completions: 0,
            }
        }
    }

    impl ProcessContract for CountingProcess {
        fn can_process(&self, _inventory: &Inventory) -> bool {
            self.runnable
        }
        fn complete(&mut self, _inventory: &mut Inventory) {
            self.completions += 1;
        }
        fn duration(&self) -> u32 {
            self.duration
        }
        fn step_cost(&self) -> u32 {
            self.cost
        }
    }

    fn powered_core(quantity: u32) -> EnergyCore {
        let mut c = ResourceContainer::buffer(1_000_000);
        let _ = c.fill_internal(quantity);
        EnergyCore::new(c)
    }

    #[test]
    fn completes_after_exactly_duration_steps() {
        let mut process = CountingProcess::new(5, 10);
        let mut state = ProcessState::new();
        let mut energy = powered_core(1000);
        let mut inv = Inventory::new(1, 64);

        for step in 1..5 {
            let outcome = step_process(&mut state, &mut process, &mut energy, &mut inv);
            assert_eq!(outcome, ProcessOutcome::Advanced, "step {step}");
            assert_eq!(state.progress(), step);
        }
        let outcome = step_process(&mut state, &mut process, &mut energy, &mut inv);
        assert_eq!(outcome, ProcessOutcome::Completed);
        assert_eq!(process.completions, 1);
        assert_eq!(state.progress(), 0);
        // 5 steps at cost 10.
        assert_eq!(energy.container.quantity(), 950);
    }

    #[test]
    fn power_withdrawal_resets_progress() {
        let mut process = CountingProcess::new(10, 10);
        let mut state = ProcessState::new();
        let mut energy = powered_core(30);
        let mut inv = Inventory::new(1, 64);

        for _ in 0..3 {
            assert_eq!(
                step_process(&mut state, &mut process, &mut energy, &mut inv),
                ProcessOutcome::Advanced
            );
        }
        assert_eq!(state.progress(), 3);

        // Container exhausted, no fuel: progress is wiped, not paused.
        assert_eq!(
            step_process(&mut state, &mut process, &mut energy, &mut inv),
            ProcessOutcome::NoPower
        );
        assert_eq!(state.progress(), 0);
        assert_eq!(process.completions, 0);
    }

    #[test]
    fn invalidation_resets_progress() {
        let mut process = CountingProcess::new(10, 1);
        let mut state = ProcessState::new();
        let mut energy = powered_core(1000);
        let mut inv = Inventory::new(1, 64);

        let _ = step_process(&mut state, &mut process, &mut energy, &mut inv);
        let _ = step_process(&mut state, &mut process, &mut energy, &mut inv);
        assert_eq!(state.progress(), 2);

        process.runnable = false;
        assert_eq!(
            step_process(&mut state, &mut process, &mut energy, &mut inv),
            ProcessOutcome::Idle
        );
        assert_eq!(state.progress(), 0);
    }

    #[test]
    fn active_burn_substitutes_for_empty_container() {
        let mut process = CountingProcess::new(3, 10);
        let mut state = ProcessState::new();
        let mut energy = powered_core(0);
        let mut inv = Inventory::new(1, 64);
        energy.fuel.ignite(100);

        for _ in 0..2 {
            assert_eq!(
                step_process(&mut state, &mut process, &mut energy, &mut inv),
                ProcessOutcome::Advanced
            );
        }
        assert_eq!(
            step_process(&mut state, &mut process, &mut energy, &mut inv),
            ProcessOutcome::Completed
        );
        assert_eq!(energy.container.quantity(), 0);
    }

    #[test]
    fn primary_container_checked_strictly_before_fuel() {
        // Both the container and an active burn can cover the cost: the
        // container is drained and the burn is left to its own countdown.
        let mut process = CountingProcess::new(5, 10);
        let mut state = ProcessState::new();
        let mut energy = powered_core(10);
        let mut inv = Inventory::new(1, 64);
        energy.fuel.ignite(50);

        let _ = step_process(&mut state, &mut process, &mut energy, &mut inv);
        assert_eq!(energy.container.quantity(), 0);
        assert_eq!(energy.fuel.burn_steps_remaining(), 50);
    }

    #[test]
    fn container_at_exact_threshold_counts_as_powered() {
        let mut process = CountingProcess::new(5, 10);
        let mut state = ProcessState::new();
        let mut energy = powered_core(10);
        let mut inv = Inventory::new(1, 64);

        assert_eq!(
            step_process(&mut state, &mut process, &mut energy, &mut inv),
            ProcessOutcome::Advanced
        );
        assert_eq!(energy.container.quantity(), 0);
    }

    #[test]
    fn ignition_gate_requires_all_three_conditions() {
        let inv = Inventory::new(2, 64);
        let process = CountingProcess::new(5, 10);

        // Powered: no ignition wanted.
        let energy = powered_core(100);
        assert!(!should_ignite(&process, &energy, &inv));

        // Unpowered and runnable: ignition wanted.
        let mut energy = powered_core(0);
        assert!(should_ignite(&process, &energy, &inv));

        // Already burning: no double ignition.
        energy.fuel.ignite(10);
        assert!(!should_ignite(&process, &energy, &inv));

        // Unpowered but nothing to process: fuel stays untouched.
        let energy = powered_core(0);
        let mut idle = CountingProcess::new(5, 10);
        idle.runnable = false;
        assert!(!should_ignite(&idle, &energy, &inv));
    }

    #[test]
    fn try_ignite_consumes_one_fuel_unit() {
        let rod = ItemTypeId(3);
        let mut inv = Inventory::new(1, 64);
        let _ = inv.insert(0, ItemStack::new(rod, 4), false);
        let mut energy = powered_core(0);

        let steps = energy.try_ignite(&mut inv, 0, |item| if item == rod { 400 } else { 0 });
        assert_eq!(steps, Some(400));
        assert!(energy.fuel.burning());
        assert_eq!(energy.fuel.max_burn_steps(), 400);
        assert_eq!(inv.stack_in(0).unwrap().quantity, 3);
    }

    #[test]
    fn try_ignite_rejects_non_fuel() {
        let mut inv = Inventory::new(1, 64);
        let _ = inv.insert(0, ItemStack::new(ItemTypeId(7), 4), false);
        let mut energy = powered_core(0);

        assert_eq!(energy.try_ignite(&mut inv, 0, |_| 0), None);
        assert!(!energy.fuel.burning());
        assert_eq!(inv.stack_in(0).unwrap().quantity, 4);
    }

    #[test]
    fn fuel_ticks_down_to_zero() {
        let mut fuel = FuelState::new();
        fuel.ignite(3);
        for _ in 0..5 {
            fuel.tick();
        }
        assert!(!fuel.burning());
        assert_eq!(fuel.burn_steps_remaining(), 0);
    }

    #[test]
    fn fuel_restore_clamps_remaining() {
        let mut fuel = FuelState::new();
        fuel.restore(900, 400);
        assert_eq!(fuel.burn_steps_remaining(), 400);
    }

    #[test]
    fn process_restore_clamps_progress() {
        let mut state = ProcessState::new();
        state.restore(700, 200);
        assert_eq!(state.progress(), 200);
    }
}
