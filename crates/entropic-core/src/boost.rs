//! Boost propagation: tiered sources, highest-wins receivers, expiry decay.
//!
//! An amplifier periodically re-validates its casing structure, yielding a
//! tier with a multiplier and a scan radius, then broadcasts the multiplier
//! to every receiver in range. A receiver keeps the highest multiplier
//! offered in the current window and decays back to 1.0 when no source
//! renews it -- a removed or invalidated source never leaves a permanent
//! stale boost.

use crate::fixed::Fixed64;
use crate::grid::GridPos;
use serde::{Serialize, Deserialize};

/// Multipliers outside this range are treated as corrupt and clamped.
pub const MULTIPLIER_MIN: f64 = 1.0;
pub const MULTIPLIER_MAX: f64 = 1000.0;

/// Scan radii outside `1..=MAX_SCAN_RADIUS` are treated as corrupt config
/// and the scan is skipped.
pub const MAX_SCAN_RADIUS: u32 = 64;

/// Clamp a multiplier into the sane range.
pub fn clamp_multiplier(m: Fixed64) -> Fixed64 {
    m.clamp(
        Fixed64::from_num(MULTIPLIER_MIN),
        Fixed64::from_num(MULTIPLIER_MAX),
    )
}

// ---------------------------------------------------------------------------
// Receiver state
// ---------------------------------------------------------------------------

/// A receiver's boost: a multiplier plus the countdown before it decays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostState {
    multiplier: Fixed64,
    expiry_steps: u32,
}

impl BoostState {
    pub fn new() -> Self {
        Self {
            multiplier: Fixed64::from_num(1),
            expiry_steps: 0,
        }
    }

    pub fn multiplier(&self) -> Fixed64 {
        self.multiplier
    }

    pub fn expiry_steps(&self) -> u32 {
        self.expiry_steps
    }

    pub fn is_boosted(&self) -> bool {
        self.multiplier > Fixed64::from_num(1)
    }

    /// Offer a multiplier to this receiver. Highest-wins: the stored value
    /// is only overwritten when the (clamped) incoming value is at least
    /// the current one, and an accepted offer always restarts the expiry
    /// countdown. Returns whether the offer was accepted.
    pub fn set_boost(&mut self, multiplier: Fixed64, expiry_steps: u32) -> bool {
        let incoming = clamp_multiplier(multiplier);
        if incoming >= self.multiplier {
            self.multiplier = incoming;
            self.expiry_steps = expiry_steps;
            true
        } else {
            false
        }
    }

    /// Count down one step. Returns true on the step the boost expires and
    /// decays back to 1.0.
    pub fn tick(&mut self) -> bool {
        if self.expiry_steps == 0 {
            return false;
        }
        self.expiry_steps -= 1;
        if self.expiry_steps == 0 && self.is_boosted() {
            self.multiplier = Fixed64::from_num(1);
            return true;
        }
        false
    }

    /// Restore persisted values, clamping out-of-range multipliers.
    pub fn restore(&mut self, multiplier: Fixed64, expiry_steps: u32) {
        self.multiplier = clamp_multiplier(multiplier);
        self.expiry_steps = expiry_steps;
    }
}

impl Default for BoostState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Validation tier of an amplifier's casing structure. Higher tiers need
/// larger structures and broadcast stronger, farther boosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmplifierTier {
    #[default]
    None,
    Tier1,
    Tier2,
    Tier3,
}

impl AmplifierTier {
    pub fn multiplier(self) -> Fixed64 {
        match self {
            AmplifierTier::None => Fixed64::from_num(1),
            AmplifierTier::Tier1 => Fixed64::from_num(4),
            AmplifierTier::Tier2 => Fixed64::from_num(8),
            AmplifierTier::Tier3 => Fixed64::from_num(16),
        }
    }

    pub fn scan_radius(self) -> u32 {
        match self {
            AmplifierTier::None => 0,
            AmplifierTier::Tier1 => 32,
            AmplifierTier::Tier2 => 48,
            AmplifierTier::Tier3 => 64,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            AmplifierTier::None => 0,
            AmplifierTier::Tier1 => 1,
            AmplifierTier::Tier2 => 2,
            AmplifierTier::Tier3 => 3,
        }
    }

    /// Decode a persisted ordinal. Out-of-range values fall back to None.
    pub fn from_ordinal(ordinal: u8) -> AmplifierTier {
        match ordinal {
            0 => AmplifierTier::None,
            1 => AmplifierTier::Tier1,
            2 => AmplifierTier::Tier2,
            3 => AmplifierTier::Tier3,
            _ => AmplifierTier::None,
        }
    }
}

/// Validate the casing structure beneath an amplifier.
///
/// Tier k requires, for every layer i in 1..=k, a complete (2i+3)-sided
/// square of casing centered i cells below the amplifier. The scan is
/// bounded by the three possible layers; it never walks the wider grid.
pub fn validate_tier(pos: GridPos, is_casing: impl Fn(GridPos) -> bool) -> AmplifierTier {
    let mut tier = AmplifierTier::None;
    for layer in 1..=3i32 {
        let half = layer + 1; // (2*layer + 3) == 2*half + 1
        let y = pos.y - layer;
        for dx in -half..=half {
            for dz in -half..=half {
                if !is_casing(GridPos::new(pos.x + dx, y, pos.z + dz)) {
                    return tier;
                }
            }
        }
        tier = match layer {
            1 => AmplifierTier::Tier1,
            2 => AmplifierTier::Tier2,
            _ => AmplifierTier::Tier3,
        };
    }
    tier
}

// ---------------------------------------------------------------------------
// Source state
// ---------------------------------------------------------------------------

/// An amplifier's runtime state: current tier plus the scan countdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplifierState {
    pub tier: AmplifierTier,
    pub scan_timer: u32,
}

impl AmplifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count down toward the next scan; on zero, reload the interval and
    /// report that a scan is due.
    pub fn scan_due(&mut self, interval: u32) -> bool {
        if self.scan_timer > 0 {
            self.scan_timer -= 1;
        }
        if self.scan_timer == 0 {
            self.scan_timer = interval.max(1);
            true
        } else {
            false
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
