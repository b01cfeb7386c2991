//! Default file locations.

use std::path::PathBuf;

/// Environment variable overriding the default config path.
pub const CONFIG_ENV: &str = "ARBWATCH_CONFIG";

/// Returns `$ARBWATCH_CONFIG`, or `config.toml` in the working directory.
pub fn default_config() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from("config.toml"), PathBuf::from)
}
