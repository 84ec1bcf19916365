//! The capture → decay → yield state machine.
//!
//! A decay chamber accepts a captured subject (an opaque snapshot plus a
//! yield-scale metric), stabilizes it, processes it for a duration fixed at
//! capture time, and converts it into an item yield. The output slot is the
//! only destination: yield beyond the slot limit is dropped, a deliberate
//! lossy policy.

use crate::fixed::Fixed64;
use crate::grid::{Face, GridPos};
use crate::id::ItemTypeId;
use crate::item::{Inventory, ItemStack};
use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Stages of the decay pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayPhase {
    /// No subject in the chamber.
    #[default]
    Empty,
    /// Subject just accepted, not yet processing.
    Captured,
    /// Waiting for a valid chamber structure.
    Stabilizing,
    /// Active decay in progress.
    Processing,
    /// Decay complete; yield emitted.
    Consumed,
}

impl DecayPhase {
    pub fn is_active(self) -> bool {
        matches!(self, DecayPhase::Stabilizing | DecayPhase::Processing)
    }

    pub fn ordinal(self) -> u8 {
        match self {
            DecayPhase::Empty => 0,
            DecayPhase::Captured => 1,
            DecayPhase::Stabilizing => 2,
            DecayPhase::Processing => 3,
            DecayPhase::Consumed => 4,
        }
    }

    /// Decode a persisted ordinal. Anything out of range is corruption and
    /// collapses to Empty.
    pub fn from_ordinal(ordinal: u8) -> DecayPhase {
        match ordinal {
            0 => DecayPhase::Empty,
            1 => DecayPhase::Captured,
            2 => DecayPhase::Stabilizing,
            3 => DecayPhase::Processing,
            4 => DecayPhase::Consumed,
            _ => DecayPhase::Empty,
        }
    }
}

// ---------------------------------------------------------------------------
// Captured subjects
// ---------------------------------------------------------------------------

/// Snapshot of a captured subject. The payload is opaque to the chamber;
/// only the metric participates in duration and yield math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSnapshot {
    pub payload: Vec<u8>,
    /// Yield-scale metric taken at capture time.
    pub metric: Fixed64,
}

// ---------------------------------------------------------------------------
// Step results
// ---------------------------------------------------------------------------

/// What one chamber step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayOutcome {
    /// Nothing happened (empty, or holding in Stabilizing).
    Held,
    /// The phase advanced without emitting yield.
    PhaseChanged(DecayPhase),
    /// Progress advanced within Processing.
    Progressed,
    /// Processing finished; this many yield items were deposited (surplus
    /// beyond the slot limit was dropped).
    Completed { deposited: u32 },
}

// ---------------------------------------------------------------------------
// Chamber
// ---------------------------------------------------------------------------

/// Decay chamber state: the phase machine plus its output inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayChamber {
    pub phase: DecayPhase,
    pub progress: u32,
    pub duration: u32,
    pub subject: Option<SubjectSnapshot>,
    /// Single output slot for the yield item.
    pub output: Inventory,
    pub yield_item: ItemTypeId,
}

impl DecayChamber {
    pub const OUTPUT_SLOT: usize = 0;

    pub fn new(yield_item: ItemTypeId, slot_limit: u32) -> Self {
        Self {
            phase: DecayPhase::Empty,
            progress: 0,
            duration: 0,
            subject: None,
            output: Inventory::new(1, slot_limit),
            yield_item,
        }
    }

    /// Accept a captured subject. Requires an empty chamber and a valid
    /// adjacent structure. The processing duration is fixed here:
    /// `max(min_duration, metric * steps_per_unit)`.
    pub fn accept_subject(
        &mut self,
        subject: SubjectSnapshot,
        steps_per_unit: u32,
        min_duration: u32,
        structure_valid: bool,
    ) -> bool {
        if self.phase != DecayPhase::Empty || !structure_valid {
            return false;
        }
        let scaled = subject.metric * Fixed64::from_num(steps_per_unit);
        let scaled: i64 = scaled.to_num();
        self.duration = (scaled.clamp(0, u32::MAX as i64) as u32).max(min_duration);
        self.progress = 0;
        self.subject = Some(subject);
        self.phase = DecayPhase::Captured;
        true
    }

    /// Advance the chamber by one step.
    ///
    /// Captured stabilizes unconditionally; Stabilizing holds until the
    /// adjacent structure is valid; Processing counts up to the fixed
    /// duration and emits the yield; Consumed clears back to Empty.
    pub fn step(&mut self, structure_valid: bool, yield_rate: Fixed64) -> DecayOutcome {
        match self.phase {
            DecayPhase::Empty => DecayOutcome::Held,
            DecayPhase::Captured => {
                self.phase = DecayPhase::Stabilizing;
                DecayOutcome::PhaseChanged(DecayPhase::Stabilizing)
            }
            DecayPhase::Stabilizing => {
                if structure_valid {
                    self.phase = DecayPhase::Processing;
                    DecayOutcome::PhaseChanged(DecayPhase::Processing)
                } else {
                    DecayOutcome::Held
                }
            }
            DecayPhase::Processing => {
                if self.duration == 0 || self.subject.is_none() {
                    // Unreachable through accept_subject; self-heal anyway.
                    self.reset();
                    return DecayOutcome::PhaseChanged(DecayPhase::Empty);
                }
                self.progress += 1;
                if self.progress >= self.duration {
                    let deposited = self.deposit_yield(yield_rate);
                    self.phase = DecayPhase::Consumed;
                    DecayOutcome::Completed { deposited }
                } else {
                    DecayOutcome::Progressed
                }
            }
            DecayPhase::Consumed => {
                self.reset();
                DecayOutcome::PhaseChanged(DecayPhase::Empty)
            }
        }
    }

    /// Compute and deposit the yield: `floor(metric * yield_rate)`, at
    /// least 1, capped by the output slot. Surplus is dropped.
    fn deposit_yield(&mut self, yield_rate: Fixed64) -> u32 {
        let metric = match &self.subject {
            Some(s) => s.metric,
            None => return 0,
        };
        let raw: i64 = (metric * yield_rate).to_num();
        let count = (raw.clamp(0, u32::MAX as i64) as u32).max(1);
        let stack = ItemStack::new(self.yield_item, count);
        match self.output.insert(Self::OUTPUT_SLOT, stack, false) {
            None => count,
            Some(rest) => count - rest.quantity,
        }
    }

    fn reset(&mut self) {
        self.phase = DecayPhase::Empty;
        self.progress = 0;
        self.duration = 0;
        self.subject = None;
    }

    /// Clamp persisted state into validity: progress within duration, and
    /// an Empty phase carries no subject or counters.
    pub fn sanitize(&mut self) {
        self.progress = self.progress.min(self.duration);
        if self.phase == DecayPhase::Empty {
            self.progress = 0;
            self.duration = 0;
            self.subject = None;
        } else if self.subject.is_none() {
            // A non-empty phase without a subject is corruption.
            self.reset();
        }
    }
}

/// The bounded adjacency-structure gate: at least one 2-high casing column
/// on a horizontal face of the chamber. Checks exactly eight cells.
pub fn chamber_structure_valid(pos: GridPos, is_casing: impl Fn(GridPos) -> bool) -> bool {
    [Face::North, Face::South, Face::East, Face::West]
        .into_iter()
        .any(|face| {
            let base = pos.offset(face);
            is_casing(base) && is_casing(base.offset(Face::Up))
        })
}

// ===========================================================================
// Tests
// ===========================================================================
