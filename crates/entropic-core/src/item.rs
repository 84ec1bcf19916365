//! Item stacks and fixed-slot inventories.
//!
//! An [`Inventory`] is a fixed-length ordered sequence of slots. Each slot
//! holds at most one stack of a single item type, bounded by a per-slot
//! limit. Stacks may carry an optional per-unit resource payload (`charge`);
//! stacks with differing payloads never merge.

use crate::id::ItemTypeId;
use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// Stacks
// ---------------------------------------------------------------------------

/// A stack of items of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: ItemTypeId,
    pub quantity: u32,
    /// Per-unit attached resource payload, if the item carries one.
    #[serde(default)]
    pub charge: Option<u32>,
}

impl ItemStack {
    pub fn new(item_type: ItemTypeId, quantity: u32) -> Self {
        Self {
            item_type,
            quantity,
            charge: None,
        }
    }

    pub fn with_charge(item_type: ItemTypeId, quantity: u32, charge: u32) -> Self {
        Self {
            item_type,
            quantity,
            charge: Some(charge),
        }
    }

    /// Whether two stacks can merge into one slot.
    pub fn merges_with(&self, other: &ItemStack) -> bool {
        self.item_type == other.item_type && self.charge == other.charge
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// One inventory slot: an optional stack plus a count limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    stack: Option<ItemStack>,
    limit: u32,
}

impl Slot {
    fn new(limit: u32) -> Self {
        Self {
            stack: None,
            limit: limit.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A fixed-length ordered sequence of slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Slot>,
}

impl Inventory {
    /// `slot_count` slots sharing one per-slot limit.
    pub fn new(slot_count: usize, limit: u32) -> Self {
        Self {
            slots: (0..slot_count).map(|_| Slot::new(limit)).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn limit(&self, slot: usize) -> u32 {
        self.slots.get(slot).map(|s| s.limit).unwrap_or(0)
    }

    pub fn stack_in(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.stack.as_ref())
    }

    pub fn stack_in_mut(&mut self, slot: usize) -> Option<&mut ItemStack> {
        self.slots.get_mut(slot).and_then(|s| s.stack.as_mut())
    }

    pub fn is_slot_empty(&self, slot: usize) -> bool {
        self.stack_in(slot).is_none()
    }

    /// Total quantity of `item_type` across all slots.
    pub fn quantity_of(&self, item_type: ItemTypeId) -> u32 {
        self.slots
            .iter()
            .filter_map(|s| s.stack.as_ref())
            .filter(|s| s.item_type == item_type)
            .map(|s| s.quantity)
            .sum()
    }

    /// Free space in a slot for the given stack (0 for incompatible
    /// occupants or an out-of-range slot).
    pub fn space_for(&self, slot: usize, stack: &ItemStack) -> u32 {
        let Some(s) = self.slots.get(slot) else {
            return 0;
        };
        match &s.stack {
            None => s.limit,
            Some(existing) if existing.merges_with(stack) => {
                s.limit.saturating_sub(existing.quantity)
            }
            Some(_) => 0,
        }
    }

    /// Try to insert a stack into a slot. Returns the remainder that did
    /// not fit (`None` when everything fit). Mutates only when `simulate`
    /// is false.
    #[must_use = "the remainder holds items that did not fit"]
    pub fn insert(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Option<ItemStack> {
        if stack.quantity == 0 {
            return None;
        }
        let space = self.space_for(slot, &stack);
        let accepted = stack.quantity.min(space);
        if accepted == 0 {
            return Some(stack);
        }
        if !simulate {
            let s = &mut self.slots[slot];
            match &mut s.stack {
                Some(existing) => existing.quantity += accepted,
                None => {
                    s.stack = Some(ItemStack {
                        quantity: accepted,
                        ..stack.clone()
                    });
                }
            }
        }
        if accepted == stack.quantity {
            None
        } else {
            Some(ItemStack {
                quantity: stack.quantity - accepted,
                ..stack
            })
        }
    }

    /// Try to extract up to `amount` items from a slot. Returns the removed
    /// stack, or `None` for an empty or out-of-range slot.
    #[must_use = "the removed stack may hold fewer items than requested"]
    pub fn extract(&mut self, slot: usize, amount: u32, simulate: bool) -> Option<ItemStack> {
        if amount == 0 {
            return None;
        }
        let s = self.slots.get_mut(slot)?;
        let existing = s.stack.as_mut()?;
        let removed = amount.min(existing.quantity);
        let out = ItemStack {
            quantity: removed,
            ..existing.clone()
        };
        if !simulate {
            existing.quantity -= removed;
            if existing.quantity == 0 {
                s.stack = None;
            }
        }
        Some(out)
    }

    /// Replace a slot's contents directly. Deserialization and process
    /// completion only; out-of-range slots are ignored.
    pub fn set_stack(&mut self, slot: usize, stack: Option<ItemStack>) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.stack = stack.filter(|st| st.quantity > 0);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
