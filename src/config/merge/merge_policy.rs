//! Merge rules: defaults, override order, conflict handling.

use super::super::{DEFAULT_BASE_URL, DEFAULT_UPLOAD_CHUNK_SIZE};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.upload_chunk_size", DEFAULT_UPLOAD_CHUNK_SIZE as i64)?
        .set_default("sync.refresh_after_mutation", true)?
        .set_default("sync.guard_concurrent_mutations", true)
}
