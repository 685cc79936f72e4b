//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, config and identity files.

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::ClientConfig;
use crate::identity::{EnvironmentSignals, FileIdentityStorage, IDENTITY_KEY, IdentityProvider};
use crate::persistence::{ensure_dir, load_json, load_json_or_default, save_json};
use vladfm_core::FeedSort;

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("vladfm").join("config.json");

    let data = serde_json::json!({"key": "value"});

    save_json(&nested_path, &data).await.unwrap();
    assert!(nested_path.exists());
    assert!(!nested_path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/config.json");

    let result: Result<ClientConfig, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_corrupted_file_falls_back_to_default() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let config: ClientConfig = load_json_or_default(&file_path).await;
    assert_eq!(config, ClientConfig::default());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Config Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_config_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");

    let config = ClientConfig {
        base_url: "https://vlad.fm/api".into(),
        timeout_secs: 5,
        retry_attempts: 3,
        default_sort: FeedSort::Discussed,
        author_name: Some("kris".into()),
    };

    config.save_to(&file_path).await.unwrap();
    let loaded = ClientConfig::load_from(&file_path).await.unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.author_or_anonymous(), "kris");
}

#[tokio::test]
async fn test_config_file_is_readable_json() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");

    ClientConfig::default().save_to(&file_path).await.unwrap();

    let raw = tokio::fs::read_to_string(&file_path).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["default_sort"], "new");
    assert_eq!(value["timeout_secs"], 15);
}

#[cfg(unix)]
#[tokio::test]
async fn test_saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("vladfm").join("config.json");
    ClientConfig::default().save_to(&file_path).await.unwrap();

    let file_mode = std::fs::metadata(&file_path).unwrap().permissions().mode() & 0o777;
    let dir_mode = std::fs::metadata(file_path.parent().unwrap())
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(file_mode, 0o600);
    assert_eq!(dir_mode, 0o700);
}

#[tokio::test]
async fn test_invalid_config_not_saved() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");

    let config = ClientConfig {
        retry_attempts: 0,
        ..Default::default()
    };
    assert!(config.save_to(&file_path).await.is_err());
    assert!(!file_path.exists());
}

// ============================================================================
// Identity File Tests
// ============================================================================

fn signals(screen_width: u32) -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: "vladfm/0.1.0 (linux; x86_64)".into(),
        locale: "en-US".into(),
        screen_width,
        screen_height: 24,
        color_depth: 24,
        timezone_offset: 0,
    }
}

#[test]
fn test_identity_file_shared_between_providers() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FileIdentityStorage::new(temp_dir.path().join("vladfm")));

    let first = IdentityProvider::new(storage.clone(), signals(80)).identity();
    // Different signals would derive a different value; the stored one wins.
    let second = IdentityProvider::new(storage, signals(120)).identity();

    assert_eq!(first, second);
    assert!(temp_dir.path().join("vladfm").join(IDENTITY_KEY).exists());
}

#[test]
fn test_unwritable_identity_dir_falls_back_to_memory() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the directory should be makes every write fail.
    let blocker = temp_dir.path().join("blocked");
    std::fs::write(&blocker, "").unwrap();

    let provider = IdentityProvider::new(
        Arc::new(FileIdentityStorage::new(&blocker)),
        signals(80),
    );
    let identity = provider.identity();

    assert!(!identity.as_str().is_empty());
    assert_eq!(provider.identity(), identity);
}
