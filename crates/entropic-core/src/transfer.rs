//! Transaction-safe resource transfer.
//!
//! Transfers are simulate-then-commit: either the full computed amount moves
//! or nothing does. A mid-commit disagreement aborts the transaction --
//! the design prefers under-transfer to duplicating or losing resource.

use crate::container::ResourceContainer;

/// The outcome of a [`transfer`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferResult {
    /// The transaction moved exactly this amount (always > 0).
    Committed(u32),
    /// Nothing moved.
    Failed,
}

impl TransferResult {
    pub fn is_committed(self) -> bool {
        matches!(self, TransferResult::Committed(_))
    }

    /// The committed amount, or 0 for a failed transaction.
    pub fn amount(self) -> u32 {
        match self {
            TransferResult::Committed(n) => n,
            TransferResult::Failed => 0,
        }
    }
}

/// Move up to `max_amount` from `source` to `dest`.
///
/// 1. Simulate extraction from the source; zero fails.
/// 2. Simulate insertion of that amount into the destination; zero fails.
/// 3. Commit-extract the minimum of both; a shortfall aborts.
/// 4. Commit-insert the extracted amount; a shortfall is a critical
///    mismatch and reports failure rather than risking duplication.
pub fn transfer(
    source: &mut ResourceContainer,
    dest: &mut ResourceContainer,
    max_amount: u32,
) -> TransferResult {
    if max_amount == 0 || !source.can_extract() || !dest.can_insert() {
        return TransferResult::Failed;
    }

    let available = source.extract(max_amount, true);
    if available == 0 {
        return TransferResult::Failed;
    }

    let accepted = dest.insert(available, true);
    if accepted == 0 {
        return TransferResult::Failed;
    }

    let to_move = available.min(accepted);

    let extracted = source.extract(to_move, false);
    if extracted != to_move {
        return TransferResult::Failed;
    }

    let inserted = dest.insert(extracted, false);
    if inserted != extracted {
        // Extract and insert disagreed mid-commit. Single-threaded stepping
        // makes this unreachable with well-behaved containers; report zero
        // committed rather than pretending a partial success.
        return TransferResult::Failed;
    }

    TransferResult::Committed(inserted)
}

// ===========================================================================
// Tests
// ===========================================================================
