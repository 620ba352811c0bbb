//! Environment sources: `TREESYNC__SECTION__KEY` plus the `TREESYNC_API_URL` shortcut.

use super::super::SyncConfig;
use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use tracing::debug;

pub const ENV_PREFIX: &str = "TREESYNC";
pub const API_URL_VAR: &str = "TREESYNC_API_URL";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    ))
}

/// Apply overrides that outrank every file and structured env source.
pub fn apply_overrides(config: &mut SyncConfig) {
    if let Ok(url) = std::env::var(API_URL_VAR) {
        let url = url.trim();
        if !url.is_empty() {
            debug!(base_url = url, "base URL overridden from environment");
            config.api.base_url = url.to_string();
        }
    }
}
