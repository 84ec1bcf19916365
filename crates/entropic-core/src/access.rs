//! Sided slot access rules.
//!
//! Each device declares which slots are inputs, outputs, or fuel, and
//! optionally pins a slot to one item type. External access additionally
//! runs through the device's [`SideConfig`]: a face must allow input for
//! insertion and output for extraction. Internal (process) access uses the
//! raw [`Inventory`] directly and bypasses all of this.

use crate::grid::{relative_side, Face, RelativeSide, SideConfig};
use crate::item::{Inventory, ItemStack};
use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Per-slot, per-side insertion and extraction rules.
pub trait SlotAccessRules {
    /// Whether `stack` may be inserted into `slot` from the given side.
    fn can_insert(&self, slot: usize, stack: &ItemStack, side: RelativeSide) -> bool;

    /// Whether items may be extracted from `slot` through the given side.
    fn can_extract(&self, slot: usize, side: RelativeSide) -> bool;
}

/// Declared slot roles for a device's inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRoles {
    pub input_slots: Vec<usize>,
    pub output_slots: Vec<usize>,
    pub fuel_slot: Option<usize>,
    /// Per-slot item-type pin; `None` accepts any type.
    pub allowed: Vec<Option<crate::id::ItemTypeId>>,
}

impl SlotRoles {
    pub fn accepts_type(&self, slot: usize, stack: &ItemStack) -> bool {
        match self.allowed.get(slot) {
            Some(Some(pinned)) => *pinned == stack.item_type,
            _ => true,
        }
    }

    pub fn is_insertable(&self, slot: usize) -> bool {
        self.input_slots.contains(&slot) || self.fuel_slot == Some(slot)
    }

    pub fn is_extractable(&self, slot: usize) -> bool {
        self.output_slots.contains(&slot)
    }
}

/// The standard insertion rule: the side allows input, the slot is an
/// input or fuel slot, and any type pin matches.
pub fn allows_insert(
    roles: &SlotRoles,
    config: &SideConfig,
    slot: usize,
    stack: &ItemStack,
    side: RelativeSide,
) -> bool {
    config.mode(side).allows_input()
        && roles.is_insertable(slot)
        && roles.accepts_type(slot, stack)
}

/// The standard extraction rule: the side allows output and the slot is an
/// output slot.
pub fn allows_extract(
    roles: &SlotRoles,
    config: &SideConfig,
    slot: usize,
    side: RelativeSide,
) -> bool {
    config.mode(side).allows_output() && roles.is_extractable(slot)
}

/// Borrowed rule view for devices that hand their roles and side config to
/// shared machinery without lending out the inventory.
pub struct SidedRules<'a> {
    pub roles: &'a SlotRoles,
    pub config: &'a SideConfig,
}

impl SlotAccessRules for SidedRules<'_> {
    fn can_insert(&self, slot: usize, stack: &ItemStack, side: RelativeSide) -> bool {
        allows_insert(self.roles, self.config, slot, stack, side)
    }

    fn can_extract(&self, slot: usize, side: RelativeSide) -> bool {
        allows_extract(self.roles, self.config, slot, side)
    }
}

// ---------------------------------------------------------------------------
// Item port
// ---------------------------------------------------------------------------

/// A borrowed view of one device's item surface: inventory plus the rules
/// and side configuration that gate external access to it.
pub struct ItemPort<'a> {
    pub inventory: &'a mut Inventory,
    pub roles: &'a SlotRoles,
    pub config: &'a SideConfig,
    pub facing: Face,
}

impl SlotAccessRules for ItemPort<'_> {
    fn can_insert(&self, slot: usize, stack: &ItemStack, side: RelativeSide) -> bool {
        allows_insert(self.roles, self.config, slot, stack, side)
    }

    fn can_extract(&self, slot: usize, side: RelativeSide) -> bool {
        allows_extract(self.roles, self.config, slot, side)
    }
}

impl ItemPort<'_> {
    /// Insert through an absolute face, walking slots in order. Returns the
    /// remainder that found no home.
    #[must_use = "the remainder holds items that did not fit"]
    pub fn insert_from(&mut self, face: Face, stack: ItemStack) -> Option<ItemStack> {
        let side = relative_side(face, self.facing);
        let mut rest = stack;
        for slot in 0..self.inventory.slot_count() {
            if !self.can_insert(slot, &rest, side) {
                continue;
            }
            match self.inventory.insert(slot, rest, false) {
                None => return None,
                Some(left) => rest = left,
            }
        }
        Some(rest)
    }

    /// Extract up to `amount` from `slot` through an absolute face.
    #[must_use = "the removed stack may hold fewer items than requested"]
    pub fn extract_through(&mut self, face: Face, slot: usize, amount: u32) -> Option<ItemStack> {
        let side = relative_side(face, self.facing);
        if !self.can_extract(slot, side) {
            return None;
        }
        self.inventory.extract(slot, amount, false)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SideMode;
    use crate::id::ItemTypeId;

    fn crystal() -> ItemTypeId {
        ItemTypeId(0)
    }
    fn rod() -> ItemTypeId {
        ItemTypeId(1)
    }

    fn roles() -> SlotRoles {
        // Slot 0 input (crystal only), slot 1 fuel (rod only), slot 2 output.
        SlotRoles {
            input_slots: vec![0],
            output_slots: vec![2],
            fuel_slot: Some(1),
            allowed: vec![Some(crystal()), Some(rod()), None],
        }
    }

    #[test]
    fn insert_lands_in_matching_slot() {
        let mut inv = Inventory::new(3, 64);
        let config = SideConfig::uniform(SideMode::Both);
        let r = roles();
        let mut port = ItemPort {
            inventory: &mut inv,
            roles: &r,
            config: &config,
            facing: Face::North,
        };

        assert!(port.insert_from(Face::East, ItemStack::new(crystal(), 5)).is_none());
        assert!(port.insert_from(Face::East, ItemStack::new(rod(), 2)).is_none());
        assert_eq!(inv.stack_in(0).unwrap().quantity, 5);
        assert_eq!(inv.stack_in(1).unwrap().quantity, 2);
    }

    #[test]
    fn insert_never_lands_in_output_slot() {
        let mut inv = Inventory::new(3, 64);
        let config = SideConfig::uniform(SideMode::Both);
        let r = SlotRoles {
            input_slots: vec![],
            output_slots: vec![2],
            fuel_slot: None,
            allowed: vec![None, None, None],
        };
        let mut port = ItemPort {
            inventory: &mut inv,
            roles: &r,
            config: &config,
            facing: Face::North,
        };

        let rest = port.insert_from(Face::East, ItemStack::new(crystal(), 5));
        assert_eq!(rest.unwrap().quantity, 5);
    }

    #[test]
    fn side_mode_gates_insertion() {
        let mut inv = Inventory::new(3, 64);
        let mut config = SideConfig::uniform(SideMode::None);
        // Only the top face accepts input.
        config.set_mode(RelativeSide::Top, SideMode::Input);
        let r = roles();
        let mut port = ItemPort {
            inventory: &mut inv,
            roles: &r,
            config: &config,
            facing: Face::North,
        };

        assert!(port.insert_from(Face::East, ItemStack::new(crystal(), 1)).is_some());
        assert!(port.insert_from(Face::Up, ItemStack::new(crystal(), 1)).is_none());
    }

    #[test]
    fn extraction_only_from_output_slots() {
        let mut inv = Inventory::new(3, 64);
        let _ = inv.insert(0, ItemStack::new(crystal(), 5), false);
        let _ = inv.insert(2, ItemStack::new(crystal(), 5), false);
        let config = SideConfig::uniform(SideMode::Both);
        let r = roles();
        let mut port = ItemPort {
            inventory: &mut inv,
            roles: &r,
            config: &config,
            facing: Face::North,
        };

        assert!(port.extract_through(Face::Down, 0, 5).is_none());
        assert_eq!(port.extract_through(Face::Down, 2, 5).unwrap().quantity, 5);
    }

    #[test]
    fn type_pin_rejects_wrong_item() {
        let mut inv = Inventory::new(3, 64);
        let config = SideConfig::uniform(SideMode::Both);
        let r = roles();
        let mut port = ItemPort {
            inventory: &mut inv,
            roles: &r,
            config: &config,
            facing: Face::North,
        };

        // Type 9 matches neither pin, and the unpinned slot 2 is an output
        // slot, so nothing accepts it.
        let rest = port.insert_from(Face::East, ItemStack::new(ItemTypeId(9), 3));
        assert_eq!(rest.unwrap().quantity, 3);
    }

    #[test]
    fn sided_rules_match_port_rules() {
        let config = SideConfig::uniform(SideMode::Both);
        let r = roles();
        let rules = SidedRules {
            roles: &r,
            config: &config,
        };
        let stack = ItemStack::new(crystal(), 1);
        assert!(rules.can_insert(0, &stack, RelativeSide::Left));
        assert!(!rules.can_insert(2, &stack, RelativeSide::Left));
        assert!(rules.can_extract(2, RelativeSide::Left));
        assert!(!rules.can_extract(0, RelativeSide::Left));
    }
}
