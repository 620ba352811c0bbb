//! Single entry point for assembling a [`SyncConfig`] from all sources.

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{env, global_file, workspace_file};
use super::SyncConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Precedence, lowest first: defaults, global file, workspace
    /// `config/config.toml`, workspace `config/{TREESYNC_ENV}.toml`,
    /// `TREESYNC__SECTION__KEY` variables, `TREESYNC_API_URL`.
    pub fn load(workspace_root: &Path) -> Result<SyncConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = env::add_to_builder(builder)?;

        let mut config: SyncConfig = builder.build()?.try_deserialize()?;
        env::apply_overrides(&mut config);
        Ok(config)
    }

    /// Load from one explicit file. Environment variables still apply on top.
    pub fn load_from_file(path: &Path) -> Result<SyncConfig, ConfigError> {
        let builder = builder_with_defaults()?.add_source(File::from(path).required(true));
        let builder = env::add_to_builder(builder)?;

        let mut config: SyncConfig = builder.build()?.try_deserialize()?;
        env::apply_overrides(&mut config);
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
