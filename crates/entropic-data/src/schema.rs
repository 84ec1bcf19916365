//! Serde structs for tunables data files.
//!
//! Every field is optional; omitted knobs keep their built-in defaults.
//! The on-disk names match the core's field names one-to-one.

use serde::Deserialize;

/// Partial tunables as read from a TOML or JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TunablesData {
    // -- Converter --
    pub converter_capacity: Option<u32>,
    pub converter_step_cost: Option<u32>,
    pub converter_duration: Option<u32>,

    // -- Generator --
    pub generator_capacity: Option<u32>,
    pub generator_base_rate: Option<u32>,
    pub generator_push_rate: Option<u32>,
    pub generator_burn_steps_per_fuel: Option<u32>,

    // -- Reservoir --
    pub reservoir_capacity: Option<u32>,
    pub reservoir_push_rate: Option<u32>,
    pub reservoir_charge_rate: Option<u32>,

    // -- Conduit --
    pub conduit_rate: Option<u32>,

    // -- Automation --
    pub auto_push_interval: Option<u32>,

    // -- Boost --
    pub amplifier_scan_interval: Option<u32>,
    pub boost_expiry_steps: Option<u32>,

    // -- Decay --
    pub decay_steps_per_unit: Option<u32>,
    pub decay_min_duration: Option<u32>,
    /// Parsed as a float and converted once at load time.
    pub decay_yield_rate: Option<f64>,

    // -- Activation cooldowns --
    pub capture_cooldown: Option<u32>,
    pub cooldown_cache_capacity: Option<u32>,
    pub cooldown_cache_ttl: Option<u32>,
}
