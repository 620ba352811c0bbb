//! CLI route: single route table and run context. Dispatches to the
//! orchestrator and settings client, then to presentation.

use crate::cli::parse::{Commands, ConfigCommands, SettingsCommands};
use crate::cli::presentation::{
    format_config_toml, format_listing, format_mutation_receipt, format_payload,
    format_tree_json, format_tree_outline, format_upload_progress,
};
use crate::config::{ConfigLoader, SyncConfig};
use crate::error::SyncError;
use crate::mutator::{MutationOp, UploadJob};
use crate::orchestrator::{NavigationOutcome, SyncOrchestrator};
use crate::settings::{install_path_from, SettingsClient};
use crate::transport::{HttpTransport, Transport};
use crate::tree::{DefaultWorkspaceTree, WorkspacePath};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runtime context for CLI execution: loaded config plus the domain facades.
/// Built from the workspace directory and optional config path using ConfigLoader only.
pub struct RunContext {
    config: SyncConfig,
    orchestrator: SyncOrchestrator,
    settings: SettingsClient,
}

impl RunContext {
    /// Create run context from workspace directory and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, SyncError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::from_config(config)
    }

    pub fn from_config(config: SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.api)?);
        let fallback = DefaultWorkspaceTree::from_policy(&config.sync)?;
        Ok(Self::with_transport(config, transport, fallback))
    }

    /// Assemble the context over an explicit transport.
    pub fn with_transport(
        config: SyncConfig,
        transport: Arc<dyn Transport>,
        fallback: DefaultWorkspaceTree,
    ) -> Self {
        let orchestrator =
            SyncOrchestrator::new(Arc::clone(&transport), fallback, config.sync.clone());
        Self {
            settings: SettingsClient::new(transport),
            orchestrator,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &SyncOrchestrator {
        &self.orchestrator
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, SyncError> {
        let started = Instant::now();
        let result = self.execute_inner(command).await;
        match &result {
            Ok(_) => info!(
                command = command.name(),
                duration_ms = started.elapsed().as_millis() as u64,
                "command completed"
            ),
            Err(e) => warn!(
                command = command.name(),
                duration_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "command failed"
            ),
        }
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, SyncError> {
        match command {
            Commands::Tree { json } => {
                let snapshot = self.orchestrator.refresh().await;
                if *json {
                    format_tree_json(&snapshot)
                } else {
                    Ok(format_tree_outline(&snapshot))
                }
            }
            Commands::Ls { path } => self.handle_ls(&WorkspacePath::parse(path)).await,
            Commands::Upload { file, target } => self.handle_upload(file, target).await,
            Commands::Mkdir { name, base } => {
                let receipt = self
                    .orchestrator
                    .mutate(MutationOp::CreateFolder {
                        base_dir: WorkspacePath::parse(base),
                        folder_name: name.clone(),
                    })
                    .await?;
                Ok(format_mutation_receipt("Created", &receipt))
            }
            Commands::Rm { path, yes } => self.handle_rm(path, *yes).await,
            Commands::Export { path } => {
                let receipt = self
                    .orchestrator
                    .mutate(MutationOp::Export {
                        source: WorkspacePath::parse(path),
                    })
                    .await?;
                Ok(format_mutation_receipt("Exported", &receipt))
            }
            Commands::Config {
                command: ConfigCommands::Show,
            } => format_config_toml(&self.config),
            Commands::Settings { command } => self.handle_settings(command).await,
        }
    }

    async fn handle_ls(&self, path: &WorkspacePath) -> Result<String, SyncError> {
        match self.orchestrator.navigate(path).await? {
            NavigationOutcome::Applied { view, .. } => Ok(format_listing(&view)),
            NavigationOutcome::Superseded { .. } => {
                Ok(format!("Navigation to {} was superseded", path))
            }
        }
    }

    async fn handle_upload(&self, file: &Path, target: &str) -> Result<String, SyncError> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let job = UploadJob::from_file(file.to_path_buf(), WorkspacePath::parse(target)).on_progress(
            move |percent| {
                let mut stderr = std::io::stderr();
                let _ = write!(stderr, "{}", format_upload_progress(&file_name, percent));
                if percent == 100 {
                    let _ = writeln!(stderr);
                }
                let _ = stderr.flush();
            },
        );
        let receipt = self.orchestrator.mutate(MutationOp::Upload(job)).await?;
        Ok(format_mutation_receipt("Uploaded to", &receipt))
    }

    async fn handle_rm(&self, path: &str, yes: bool) -> Result<String, SyncError> {
        let target = WorkspacePath::parse(path);
        if !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Delete '{}' from the workspace? This cannot be undone.",
                    target
                ))
                .default(false)
                .interact()
                .map_err(|e| SyncError::Config(format!("Failed to get user input: {}", e)))?;

            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }

        let receipt = self
            .orchestrator
            .mutate(MutationOp::Delete { path: target })
            .await?;
        Ok(format_mutation_receipt("Deleted", &receipt))
    }

    async fn handle_settings(&self, command: &SettingsCommands) -> Result<String, SyncError> {
        match command {
            SettingsCommands::SshKey { email } => {
                let payload = self.settings.generate_ssh_key(email).await?;
                Ok(format_payload(&payload))
            }
            SettingsCommands::SubmitEmail { email } => {
                let payload = self.settings.submit_email(email).await?;
                Ok(format_payload(&payload))
            }
            SettingsCommands::InstallPath { set: Some(path) } => {
                let payload = self.settings.update_install_path(path).await?;
                Ok(format_payload(&payload))
            }
            SettingsCommands::InstallPath { set: None } => {
                let payload = self.settings.get_install_path().await?;
                Ok(install_path_from(&payload).unwrap_or_else(|| format_payload(&payload)))
            }
        }
    }
}
