//! Numeric tunables with declared bounds.
//!
//! Every knob carries a `[min, max]` range. Values are normalized once, at
//! load time, by [`Tunables::clamped`]: out-of-range values snap to the
//! nearest bound and the offending field names are reported back so the
//! host can log each exactly once. Nothing here can fail the simulation.

use crate::fixed::Fixed64;
use serde::{Serialize, Deserialize};

/// All numeric tunables of the simulation, in step/quantity units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // -- Converter --
    pub converter_capacity: u32,
    pub converter_step_cost: u32,
    pub converter_duration: u32,

    // -- Generator --
    pub generator_capacity: u32,
    pub generator_base_rate: u32,
    pub generator_push_rate: u32,
    pub generator_burn_steps_per_fuel: u32,

    // -- Reservoir --
    pub reservoir_capacity: u32,
    pub reservoir_push_rate: u32,
    pub reservoir_charge_rate: u32,

    // -- Conduit --
    pub conduit_rate: u32,

    // -- Automation --
    pub auto_push_interval: u32,

    // -- Boost --
    pub amplifier_scan_interval: u32,
    pub boost_expiry_steps: u32,

    // -- Decay --
    pub decay_steps_per_unit: u32,
    pub decay_min_duration: u32,
    pub decay_yield_rate: Fixed64,

    // -- Activation cooldowns --
    pub capture_cooldown: u32,
    pub cooldown_cache_capacity: u32,
    pub cooldown_cache_ttl: u32,
}

/// Bounds table: `(field, min, max)` for the integer knobs.
const U32_BOUNDS: &[(&str, u32, u32)] = &[
    ("converter_capacity", 1_000, 100_000_000),
    ("converter_step_cost", 1, 1_000_000),
    ("converter_duration", 1, 1_000_000),
    ("generator_capacity", 1_000, 100_000_000),
    ("generator_base_rate", 1, 1_000_000),
    ("generator_push_rate", 1, 1_000_000),
    ("generator_burn_steps_per_fuel", 1, 1_000_000),
    ("reservoir_capacity", 1_000, 1_000_000_000),
    ("reservoir_push_rate", 1, 1_000_000),
    ("reservoir_charge_rate", 1, 1_000_000),
    ("conduit_rate", 1, 100_000),
    ("auto_push_interval", 1, 1_000),
    ("amplifier_scan_interval", 20, 10_000),
    ("boost_expiry_steps", 1, 10_000),
    ("decay_steps_per_unit", 1, 1_000),
    ("decay_min_duration", 1, 10_000),
    ("capture_cooldown", 0, 10_000),
    ("cooldown_cache_capacity", 1, 65_536),
    ("cooldown_cache_ttl", 1, 1_000_000),
];

/// Bounds for `decay_yield_rate`.
const YIELD_RATE_MIN: f64 = 0.01;
const YIELD_RATE_MAX: f64 = 10.0;

impl Default for Tunables {
    fn default() -> Self {
        Self {
            converter_capacity: 100_000,
            converter_step_cost: 40,
            converter_duration: 200,
            generator_capacity: 500_000,
            generator_base_rate: 256,
            generator_push_rate: 10_000,
            generator_burn_steps_per_fuel: 400,
            reservoir_capacity: 10_000_000,
            reservoir_push_rate: 10_000,
            reservoir_charge_rate: 1_000,
            conduit_rate: 500,
            auto_push_interval: 10,
            amplifier_scan_interval: 200,
            boost_expiry_steps: 250,
            decay_steps_per_unit: 10,
            decay_min_duration: 20,
            decay_yield_rate: Fixed64::from_num(0.5),
            capture_cooldown: 100,
            cooldown_cache_capacity: 256,
            cooldown_cache_ttl: 12_000,
        }
    }
}

impl Tunables {
    fn u32_fields_mut(&mut self) -> [&mut u32; 19] {
        [
            &mut self.converter_capacity,
            &mut self.converter_step_cost,
            &mut self.converter_duration,
            &mut self.generator_capacity,
            &mut self.generator_base_rate,
            &mut self.generator_push_rate,
            &mut self.generator_burn_steps_per_fuel,
            &mut self.reservoir_capacity,
            &mut self.reservoir_push_rate,
            &mut self.reservoir_charge_rate,
            &mut self.conduit_rate,
            &mut self.auto_push_interval,
            &mut self.amplifier_scan_interval,
            &mut self.boost_expiry_steps,
            &mut self.decay_steps_per_unit,
            &mut self.decay_min_duration,
            &mut self.capture_cooldown,
            &mut self.cooldown_cache_capacity,
            &mut self.cooldown_cache_ttl,
        ]
    }

    /// Normalize all knobs into their declared bounds. Returns the names of
    /// the fields that had to be clamped, for one-time logging.
    pub fn clamped(mut self) -> (Self, Vec<&'static str>) {
        let mut adjusted = Vec::new();

        for (field, &(name, min, max)) in self.u32_fields_mut().into_iter().zip(U32_BOUNDS) {
            let clamped = (*field).clamp(min, max);
            if clamped != *field {
                *field = clamped;
                adjusted.push(name);
            }
        }

        let rate = self.decay_yield_rate.clamp(
            Fixed64::from_num(YIELD_RATE_MIN),
            Fixed64::from_num(YIELD_RATE_MAX),
        );
        if rate != self.decay_yield_rate {
            self.decay_yield_rate = rate;
            adjusted.push("decay_yield_rate");
        }

        (self, adjusted)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
