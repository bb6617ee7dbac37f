//! Configuration management for Waypoint services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`WAYPOINT_` prefix, `__` between section and key,
//!    e.g. `WAYPOINT_OPENAI__API_KEY`)
//! 2. Config file (`waypoint.toml` by default, optional)
//! 3. Defaults
//!
//! Each crate owns the struct for its own section and gives every field a
//! serde default, so a partially specified section still deserializes.

use serde::de::DeserializeOwned;

use crate::error::WaypointError;

/// Environment variable prefix for all Waypoint settings.
pub const ENV_PREFIX: &str = "WAYPOINT";

/// Build the layered configuration for the given file prefix.
pub fn load(file_prefix: &str) -> Result<config::Config, WaypointError> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(cfg)
}

/// Deserialize one section, falling back to its defaults when it is absent.
pub fn section<T>(cfg: &config::Config, name: &str) -> Result<T, WaypointError>
where
    T: DeserializeOwned + Default,
{
    match cfg.get::<T>(name) {
        Ok(value) => Ok(value),
        Err(config::ConfigError::NotFound(_)) => {
            tracing::debug!(section = name, "Config section missing, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(WaypointError::Config(format!("[{name}]: {e}"))),
    }
}
