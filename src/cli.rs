//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{exit_code, map_error};
pub use parse::{Cli, Commands, ConfigCommands, SettingsCommands};
pub use presentation::{
    format_config_toml, format_degraded_banner, format_listing, format_mutation_receipt,
    format_payload, format_section_heading, format_tree_json, format_tree_outline,
    format_upload_progress,
};
pub use route::RunContext;
