//! Integration tests for configuration layering

use std::sync::Mutex;
use tempfile::TempDir;
use treesync::config::{ConfigLoader, API_URL_VAR, ENV_NAME_VAR};
use treesync::{SyncError, SyncOrchestrator};

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 4] = [
    API_URL_VAR,
    ENV_NAME_VAR,
    "TREESYNC__API__UPLOAD_CHUNK_SIZE",
    "TREESYNC__SYNC__REFRESH_AFTER_MUTATION",
];

/// Run `f` with the given variables set and every other treesync variable
/// cleared, restoring the previous values afterwards.
fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> =
        VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();
    for key in VARS {
        std::env::remove_var(key);
    }
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = f();

    for (key, value) in saved {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    result
}

fn write_workspace_config(dir: &TempDir, name: &str, contents: &str) {
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join(name), contents).unwrap();
}

#[test]
fn test_defaults_without_any_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = with_env(&[], || ConfigLoader::load(temp_dir.path()).unwrap());
    assert_eq!(config.api.upload_chunk_size, 64 * 1024);
    assert!(config.sync.refresh_after_mutation);
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_file_overrides_base_file() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        &temp_dir,
        "config.toml",
        r#"
[api]
base_url = "http://base.local:3001"
upload_chunk_size = 1024
"#,
    );
    write_workspace_config(
        &temp_dir,
        "staging.toml",
        r#"
[api]
base_url = "http://staging.local:3001"
"#,
    );

    let config = with_env(&[(ENV_NAME_VAR, "staging")], || {
        ConfigLoader::load(temp_dir.path()).unwrap()
    });
    assert_eq!(config.api.base_url, "http://staging.local:3001");
    assert_eq!(config.api.upload_chunk_size, 1024);

    let config = with_env(&[], || ConfigLoader::load(temp_dir.path()).unwrap());
    assert_eq!(config.api.base_url, "http://base.local:3001");
}

#[test]
fn test_env_variables_override_files() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        &temp_dir,
        "config.toml",
        r#"
[api]
base_url = "http://file.local:3001"
upload_chunk_size = 1024

[sync]
refresh_after_mutation = true
"#,
    );

    let config = with_env(
        &[
            ("TREESYNC__API__UPLOAD_CHUNK_SIZE", "4096"),
            ("TREESYNC__SYNC__REFRESH_AFTER_MUTATION", "false"),
            (API_URL_VAR, "http://10.21.235.116:3001"),
        ],
        || ConfigLoader::load(temp_dir.path()).unwrap(),
    );
    assert_eq!(config.api.base_url, "http://10.21.235.116:3001");
    assert_eq!(config.api.upload_chunk_size, 4096);
    assert!(!config.sync.refresh_after_mutation);
}

#[test]
fn test_api_url_override_applies_to_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("custom.toml");
    std::fs::write(&file, "[api]\nbase_url = \"http://file.local:3001\"\n").unwrap();

    let config = with_env(&[(API_URL_VAR, "https://override.local")], || {
        ConfigLoader::load_from_file(&file).unwrap()
    });
    assert_eq!(config.api.base_url, "https://override.local");
}

#[test]
fn test_invalid_url_is_rejected_at_startup() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        &temp_dir,
        "config.toml",
        "[api]\nbase_url = \"ftp://files.local\"\n",
    );
    let config = with_env(&[], || ConfigLoader::load(temp_dir.path()).unwrap());
    assert!(matches!(
        SyncOrchestrator::from_config(&config),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn test_fallback_tree_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let fallback = temp_dir.path().join("fallback.json");
    std::fs::write(&fallback, r#"{"root": {"offline.md": {}}}"#).unwrap();
    write_workspace_config(
        &temp_dir,
        "config.toml",
        &format!("[sync]\nfallback_tree = {:?}\n", fallback.to_string_lossy()),
    );

    let config = with_env(&[], || ConfigLoader::load(temp_dir.path()).unwrap());
    assert_eq!(config.sync.fallback_tree.as_deref(), Some(fallback.as_path()));
    let orchestrator = SyncOrchestrator::from_config(&config).unwrap();
    assert_eq!(orchestrator.cache().fallback().tree().counts().files, 1);
}

#[test]
fn test_missing_fallback_tree_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = with_env(&[], || ConfigLoader::load(temp_dir.path()).unwrap());
    config.sync.fallback_tree = Some(temp_dir.path().join("absent.json"));
    assert!(matches!(
        SyncOrchestrator::from_config(&config),
        Err(SyncError::Io { .. })
    ));
}
