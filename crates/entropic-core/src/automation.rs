//! Periodic auto-push of output slots to neighboring sinks.
//!
//! Every `interval` steps the router walks its declared output slots and
//! offers their contents to each of the six neighbors in fixed face order.
//! Faces are skipped when the device's own rules deny extraction there;
//! neighbors are skipped when they are unloaded or present no compatible
//! sink. The sink side is abstracted behind a callback so the router stays
//! independent of the world representation.

use crate::access::SlotAccessRules;
use crate::grid::{relative_side, Face};
use crate::item::{Inventory, ItemStack};
use serde::{Serialize, Deserialize};

/// One completed push, for event reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedItems {
    pub face: Face,
    pub item_type: crate::id::ItemTypeId,
    pub quantity: u32,
}

/// Auto-push timer state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automation {
    push_timer: u32,
}

impl Automation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timer; fires (and resets) once the interval is reached.
    pub fn due(&mut self, interval: u32) -> bool {
        self.push_timer += 1;
        if self.push_timer < interval.max(1) {
            return false;
        }
        self.push_timer = 0;
        true
    }

    /// Restore a persisted timer value, clamped below the interval.
    pub fn restore(&mut self, timer: u32, interval: u32) {
        self.push_timer = timer.min(interval.max(1) - 1);
    }

    pub fn timer(&self) -> u32 {
        self.push_timer
    }

    /// Push output-slot contents to neighboring sinks.
    ///
    /// `sink(face, stack)` offers a stack to the neighbor through `face`;
    /// it returns `None` when there is no sink that way (unloaded, absent,
    /// or incompatible), otherwise the remainder that was not accepted.
    /// Each slot stops as soon as it runs empty.
    pub fn push_outputs(
        rules: &impl SlotAccessRules,
        inventory: &mut Inventory,
        output_slots: &[usize],
        facing: Face,
        mut sink: impl FnMut(Face, ItemStack) -> Option<Option<ItemStack>>,
    ) -> Vec<PushedItems> {
        let mut pushed = Vec::new();
        for &slot in output_slots {
            for face in Face::ALL {
                let Some(stack) = inventory.stack_in(slot) else {
                    break;
                };
                if !rules.can_extract(slot, relative_side(face, facing)) {
                    continue;
                }
                let offer = stack.clone();
                let Some(rest) = sink(face, offer.clone()) else {
                    continue;
                };
                let accepted = offer.quantity - rest.map_or(0, |r| r.quantity);
                if accepted > 0 {
                    // Internal extraction from our own slot bypasses rules.
                    let _ = inventory.extract(slot, accepted, false);
                    pushed.push(PushedItems {
                        face,
                        item_type: offer.item_type,
                        quantity: accepted,
                    });
                }
            }
        }
        pushed
    }
}

// ===========================================================================
// Tests
// ===========================================================================
