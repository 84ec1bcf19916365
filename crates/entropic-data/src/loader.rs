//! Tunables loading from TOML and JSON.

use crate::schema::TunablesData;
use entropic_core::config::Tunables;
use entropic_core::fixed::f64_to_fixed64;

/// Errors that can occur while parsing a tunables file. Out-of-range
/// values are not errors: they clamp.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// The result of a load: normalized tunables plus the names of any fields
/// that were clamped to their bounds (for one-time logging).
#[derive(Debug, Clone)]
pub struct LoadedTunables {
    pub tunables: Tunables,
    pub clamped_fields: Vec<&'static str>,
}

/// Load tunables from a TOML string.
pub fn load_tunables_toml(text: &str) -> Result<LoadedTunables, DataLoadError> {
    let data: TunablesData = toml::from_str(text)?;
    Ok(merge(data))
}

/// Load tunables from a JSON string.
pub fn load_tunables_json(text: &str) -> Result<LoadedTunables, DataLoadError> {
    let data: TunablesData = serde_json::from_str(text)?;
    Ok(merge(data))
}

fn merge(data: TunablesData) -> LoadedTunables {
    let mut t = Tunables::default();

    macro_rules! apply {
        ($($field:ident),* $(,)?) => {
            $(if let Some(v) = data.$field {
                t.$field = v;
            })*
        };
    }
    apply!(
        converter_capacity,
        converter_step_cost,
        converter_duration,
        generator_capacity,
        generator_base_rate,
        generator_push_rate,
        generator_burn_steps_per_fuel,
        reservoir_capacity,
        reservoir_push_rate,
        reservoir_charge_rate,
        conduit_rate,
        auto_push_interval,
        amplifier_scan_interval,
        boost_expiry_steps,
        decay_steps_per_unit,
        decay_min_duration,
        capture_cooldown,
        cooldown_cache_capacity,
        cooldown_cache_ttl,
    );
    if let Some(rate) = data.decay_yield_rate {
        t.decay_yield_rate = f64_to_fixed64(rate);
    }

    let (tunables, clamped_fields) = t.clamped();
    LoadedTunables {
        tunables,
        clamped_fields,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let loaded = load_tunables_toml("").unwrap();
        assert_eq!(loaded.tunables, Tunables::default());
        assert!(loaded.clamped_fields.is_empty());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let loaded = load_tunables_toml(
            r#"
            conduit_rate = 750
            auto_push_interval = 5
            decay_yield_rate = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(loaded.tunables.conduit_rate, 750);
        assert_eq!(loaded.tunables.auto_push_interval, 5);
        assert_eq!(loaded.tunables.decay_yield_rate, f64_to_fixed64(1.5));
        // Untouched knobs keep their defaults.
        assert_eq!(
            loaded.tunables.converter_duration,
            Tunables::default().converter_duration
        );
        assert!(loaded.clamped_fields.is_empty());
    }

    #[test]
    fn out_of_range_values_clamp_and_report() {
        let loaded = load_tunables_toml(
            r#"
            conduit_rate = 0
            amplifier_scan_interval = 999999
            "#,
        )
        .unwrap();
        assert_eq!(loaded.tunables.conduit_rate, 1);
        assert_eq!(loaded.tunables.amplifier_scan_interval, 10_000);
        assert_eq!(
            loaded.clamped_fields,
            vec!["conduit_rate", "amplifier_scan_interval"]
        );
    }

    #[test]
    fn json_loads_equivalently() {
        let loaded = load_tunables_json(r#"{"conduit_rate": 250}"#).unwrap();
        assert_eq!(loaded.tunables.conduit_rate, 250);
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            load_tunables_toml("conduit_rate = \"fast\""),
            Err(DataLoadError::TomlParse(_))
        ));
        assert!(matches!(
            load_tunables_json("{not json"),
            Err(DataLoadError::JsonParse(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(load_tunables_toml("warp_speed = 9").is_err());
    }
}
