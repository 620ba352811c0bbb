//! CLI parse: clap types for treesync. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// treesync CLI - browse and mutate a sparse, git-backed remote workspace
#[derive(Parser)]
#[command(name = "treesync")]
#[command(about = "Browse and mutate a sparse, git-backed remote workspace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for config/config.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and print the whole workspace tree
    Tree {
        /// Print the raw nested-object form instead of an outline
        #[arg(long)]
        json: bool,
    },
    /// Navigate into a directory (sparse pull) and list it
    Ls {
        /// Workspace path; "root" or "/" for the top level
        #[arg(default_value = "root")]
        path: String,
    },
    /// Upload a local file, then commit and push it
    Upload {
        /// Local file to upload
        file: PathBuf,
        /// Target directory in the workspace
        #[arg(long = "to", default_value = "root")]
        target: String,
    },
    /// Create a folder
    Mkdir {
        /// Folder name
        name: String,
        /// Parent directory in the workspace
        #[arg(long = "in", default_value = "root")]
        base: String,
    },
    /// Delete a file or folder (irreversible)
    Rm {
        /// Workspace path
        path: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Copy a file or folder into the server's install location
    Export {
        /// Workspace path
        path: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Server settings (SSH key, install location)
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Generate an SSH key pair on the server
    SshKey {
        /// Account email for the key
        email: String,
    },
    /// Submit the account email to the server
    SubmitEmail { email: String },
    /// Show the install location, or change it with --set
    InstallPath {
        /// New install location
        #[arg(long)]
        set: Option<String>,
    },
}

impl Commands {
    /// Dotted command name for logs (e.g. "settings.ssh_key").
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Tree { .. } => "tree",
            Commands::Ls { .. } => "ls",
            Commands::Upload { .. } => "upload",
            Commands::Mkdir { .. } => "mkdir",
            Commands::Rm { .. } => "rm",
            Commands::Export { .. } => "export",
            Commands::Config {
                command: ConfigCommands::Show,
            } => "config.show",
            Commands::Settings { command } => match command {
                SettingsCommands::SshKey { .. } => "settings.ssh_key",
                SettingsCommands::SubmitEmail { .. } => "settings.submit_email",
                SettingsCommands::InstallPath { .. } => "settings.install_path",
            },
        }
    }
}
