//! Data-file loading for the simulation tunables.
//!
//! Tunables files are partial: any knob may be omitted and falls back to
//! its built-in default. Out-of-range values are clamped to their declared
//! bounds by the core, and the adjusted field names are returned so the
//! host can log each exactly once.

pub mod loader;
pub mod schema;

pub use loader::{load_tunables_json, load_tunables_toml, DataLoadError, LoadedTunables};
