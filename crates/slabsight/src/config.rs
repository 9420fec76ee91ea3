//! Configuration loading

use anyhow::Result;
use slabsight_lib::MonitorConfig;

/// Load configuration from `SLABSIGHT_`-prefixed environment variables,
/// falling back to defaults for anything unset.
pub fn load() -> Result<MonitorConfig> {
    let config = config::Config::builder()
        .add_source(config::Environment::with_prefix("SLABSIGHT"))
        .build()?;

    Ok(config
        .try_deserialize()
        .unwrap_or_else(|_| MonitorConfig::default()))
}
