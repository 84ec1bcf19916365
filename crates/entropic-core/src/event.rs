//! Typed simulation events with a pre-allocated ring buffer.
//!
//! Devices record events as they step; the host drains the log after each
//! step (or batch of steps) for UI, analytics, or logging. The buffer has a
//! fixed capacity and drops the oldest events when full -- recording never
//! allocates after construction.

use crate::boost::AmplifierTier;
use crate::container::ResourceKind;
use crate::decay::DecayPhase;
use crate::fixed::{Fixed64, Steps};
use crate::grid::GridPos;
use crate::id::ItemTypeId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Why a processing device made no progress this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// No runnable process (missing inputs or full output).
    CannotProcess,
    /// No power from the primary container or fuel.
    NoPower,
}

/// A simulation event. All events carry the step at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    // -- Processing --
    ProcessCompleted {
        pos: GridPos,
        step: Steps,
    },
    ProcessHalted {
        pos: GridPos,
        reason: HaltReason,
        step: Steps,
    },
    FuelIgnited {
        pos: GridPos,
        burn_steps: u32,
        step: Steps,
    },

    // -- Resource movement --
    TransferCommitted {
        kind: ResourceKind,
        from: GridPos,
        to: GridPos,
        amount: u32,
        step: Steps,
    },
    ItemsPushed {
        from: GridPos,
        to: GridPos,
        item_type: ItemTypeId,
        quantity: u32,
        step: Steps,
    },

    // -- Boost --
    TierChanged {
        pos: GridPos,
        tier: AmplifierTier,
        step: Steps,
    },
    BoostApplied {
        source: GridPos,
        receiver: GridPos,
        multiplier: Fixed64,
        step: Steps,
    },
    BoostExpired {
        pos: GridPos,
        step: Steps,
    },

    // -- Decay --
    DecayPhaseChanged {
        pos: GridPos,
        phase: DecayPhase,
        step: Steps,
    },
    DecayCompleted {
        pos: GridPos,
        deposited: u32,
        step: Steps,
    },

    // -- Configuration --
    /// A tunable was out of range and clamped to its nearest bound.
    /// Emitted once per field at load time.
    ConfigClamped {
        field: &'static str,
        step: Steps,
    },
}

// ---------------------------------------------------------------------------
// EventLog -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer of simulation events. When full, the oldest
/// events are dropped.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<Option<SimEvent>>,
    head: usize,
    len: usize,
    total_recorded: u64,
}

impl EventLog {
    /// Create a log with the given capacity. Zero is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_recorded: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events ever recorded, including dropped ones.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Record one event, dropping the oldest if the buffer is full.
    pub fn record(&mut self, event: SimEvent) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_recorded += 1;
    }

    /// Drain all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        let capacity = self.capacity();
        let start = (self.head + capacity - self.len) % capacity;
        let mut out = Vec::with_capacity(self.len);
        for i in 0..self.len {
            if let Some(event) = self.events[(start + i) % capacity].take() {
                out.push(event);
            }
        }
        self.len = 0;
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
