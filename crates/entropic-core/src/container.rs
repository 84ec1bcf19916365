//! Bounded resource containers.
//!
//! A [`ResourceContainer`] stores a single resource quantity with a hard
//! capacity, per-operation transfer caps, and insert/extract access flags.
//! All operations are clamped: no overflow, no underflow, no negative
//! values. Committed mutations bump a revision counter that the host polls
//! for dirty tracking; simulated calls never do.

use serde::{Serialize, Deserialize};

/// The resource flavors devices move around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Energy-like resource consumed by processing.
    Charge,
    /// Entropy-like resource produced by decay lines.
    Entropy,
}

/// A bounded quantity store with per-operation transfer-rate limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContainer {
    quantity: u32,
    capacity: u32,
    /// Maximum accepted per insert operation. 0 = no limit beyond capacity.
    max_insert_per_op: u32,
    /// Maximum removed per extract operation. 0 = no limit beyond contents.
    max_extract_per_op: u32,
    insert_allowed: bool,
    extract_allowed: bool,
    /// Bumped on every committed mutation. Not persisted.
    #[serde(skip)]
    revision: u64,
}

impl ResourceContainer {
    /// Full constructor. A zero capacity is clamped to 1.
    pub fn new(
        capacity: u32,
        max_insert_per_op: u32,
        max_extract_per_op: u32,
        insert_allowed: bool,
        extract_allowed: bool,
    ) -> Self {
        Self {
            quantity: 0,
            capacity: capacity.max(1),
            max_insert_per_op,
            max_extract_per_op,
            insert_allowed,
            extract_allowed,
            revision: 0,
        }
    }

    /// A bidirectional buffer with unlimited per-operation rates.
    pub fn buffer(capacity: u32) -> Self {
        Self::new(capacity, 0, 0, true, true)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn can_insert(&self) -> bool {
        self.insert_allowed
    }

    pub fn can_extract(&self) -> bool {
        self.extract_allowed
    }

    /// Revision counter for dirty tracking. Bumped only by committed
    /// mutations.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_full(&self) -> bool {
        self.quantity >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Fill ratio in [0.0, 1.0]. Display only.
    pub fn fill_ratio(&self) -> f64 {
        self.quantity as f64 / self.capacity as f64
    }

    /// Try to insert `amount`. Returns the amount accepted.
    ///
    /// Rejects when insertion is disallowed or `amount` is zero; otherwise
    /// accepts up to the free space and the per-operation cap. Mutates and
    /// bumps the revision only when `simulate` is false.
    #[must_use = "the accepted amount may be less than requested"]
    pub fn insert(&mut self, amount: u32, simulate: bool) -> u32 {
        if !self.insert_allowed || amount == 0 {
            return 0;
        }
        let space = self.capacity - self.quantity;
        let mut to_insert = amount.min(space);
        if self.max_insert_per_op > 0 {
            to_insert = to_insert.min(self.max_insert_per_op);
        }
        if to_insert > 0 && !simulate {
            self.quantity += to_insert;
            self.revision += 1;
        }
        to_insert
    }

    /// Try to extract `amount`. Returns the amount removed.
    #[must_use = "the removed amount may be less than requested"]
    pub fn extract(&mut self, amount: u32, simulate: bool) -> u32 {
        if !self.extract_allowed || amount == 0 {
            return 0;
        }
        let mut to_extract = amount.min(self.quantity);
        if self.max_extract_per_op > 0 {
            to_extract = to_extract.min(self.max_extract_per_op);
        }
        if to_extract > 0 && !simulate {
            self.quantity -= to_extract;
            self.revision += 1;
        }
        to_extract
    }

    /// Process-internal fill: respects capacity only, bypassing access flags
    /// and per-operation caps. Returns the amount accepted.
    #[must_use = "the accepted amount may be less than requested"]
    pub fn fill_internal(&mut self, amount: u32) -> u32 {
        let accepted = amount.min(self.capacity - self.quantity);
        if accepted > 0 {
            self.quantity += accepted;
            self.revision += 1;
        }
        accepted
    }

    /// Process-internal drain of exactly `amount`, bypassing access flags
    /// and per-operation caps. Returns false if the contents do not cover it.
    pub fn drain_internal(&mut self, amount: u32) -> bool {
        if self.quantity < amount {
            return false;
        }
        if amount > 0 {
            self.quantity -= amount;
            self.revision += 1;
        }
        true
    }

    /// Set the quantity directly, clamped to `[0, capacity]`.
    /// Deserialization only.
    pub fn set_quantity(&mut self, value: u32) {
        self.quantity = value.min(self.capacity);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_extract() {
        let mut c = ResourceContainer::buffer(100);
        assert_eq!(c.insert(60, false), 60);
        assert_eq!(c.quantity(), 60);
        assert_eq!(c.extract(20, false), 20);
        assert_eq!(c.quantity(), 40);
    }

    #[test]
    fn insert_clamps_to_capacity() {
        let mut c = ResourceContainer::buffer(50);
        assert_eq!(c.insert(80, false), 50);
        assert_eq!(c.quantity(), 50);
        assert!(c.is_full());
        assert_eq!(c.insert(1, false), 0);
    }

    #[test]
    fn extract_clamps_to_contents() {
        let mut c = ResourceContainer::buffer(100);
        let _ = c.insert(30, false);
        assert_eq!(c.extract(100, false), 30);
        assert!(c.is_empty());
    }

    #[test]
    fn per_op_caps_apply() {
        let mut c = ResourceContainer::new(1000, 25, 10, true, true);
        assert_eq!(c.insert(100, false), 25);
        assert_eq!(c.extract(100, false), 10);
        assert_eq!(c.quantity(), 15);
    }

    #[test]
    fn zero_per_op_cap_means_unlimited() {
        let mut c = ResourceContainer::new(1000, 0, 0, true, true);
        assert_eq!(c.insert(1000, false), 1000);
        assert_eq!(c.extract(1000, false), 1000);
    }

    #[test]
    fn access_flags_reject() {
        let mut sink = ResourceContainer::new(100, 0, 0, true, false);
        assert_eq!(sink.insert(10, false), 10);
        assert_eq!(sink.extract(10, false), 0);

        let mut source = ResourceContainer::new(100, 0, 0, false, true);
        assert_eq!(source.insert(10, false), 0);
    }

    #[test]
    fn zero_amount_rejected() {
        let mut c = ResourceContainer::buffer(100);
        assert_eq!(c.insert(0, false), 0);
        assert_eq!(c.extract(0, false), 0);
        assert_eq!(c.revision(), 0);
    }

    #[test]
    fn simulate_never_mutates() {
        let mut c = ResourceContainer::buffer(100);
        let _ = c.insert(40, false);
        let rev = c.revision();
        for _ in 0..10 {
            assert_eq!(c.insert(10, true), 10);
            assert_eq!(c.extract(10, true), 10);
        }
        assert_eq!(c.quantity(), 40);
        assert_eq!(c.revision(), rev);
    }

    #[test]
    fn committed_mutations_bump_revision() {
        let mut c = ResourceContainer::buffer(100);
        assert_eq!(c.revision(), 0);
        let _ = c.insert(5, false);
        assert_eq!(c.revision(), 1);
        let _ = c.extract(5, false);
        assert_eq!(c.revision(), 2);
        // A rejected operation leaves the revision alone.
        let _ = c.extract(5, false);
        assert_eq!(c.revision(), 2);
    }

    #[test]
    fn internal_paths_bypass_gating() {
        let mut c = ResourceContainer::new(100, 5, 0, false, false);
        assert_eq!(c.fill_internal(60), 60);
        assert!(c.drain_internal(40));
        assert!(!c.drain_internal(40));
        assert_eq!(c.quantity(), 20);
    }

    #[test]
    fn zero_capacity_clamped_to_one() {
        let c = ResourceContainer::buffer(0);
        assert_eq!(c.capacity(), 1);
    }

    #[test]
    fn set_quantity_clamps() {
        let mut c = ResourceContainer::buffer(10);
        c.set_quantity(500);
        assert_eq!(c.quantity(), 10);
    }
}
