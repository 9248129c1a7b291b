// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Parley configuration system.

use std::io::Write;

use parley_config::diagnostic::ConfigError;
use parley_config::model::ParleyConfig;
use parley_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use parley_core::PendingPlacement;
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_parley_config() {
    let toml = r#"
[app]
id = "team-room"
log_level = "debug"

[backend]
api_key = "AIza-test"
auth_domain = "team.example.com"
project_id = "team"

[identity]
continuation_token = "resume-me"

[sync]
pending_placement = "first"
resubscribe_max_attempts = 3
resubscribe_initial_backoff_ms = 100
resubscribe_max_backoff_ms = 1000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.id, "team-room");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.backend.api_key, "AIza-test");
    assert_eq!(config.backend.auth_domain, "team.example.com");
    assert_eq!(config.backend.project_id, "team");
    assert_eq!(
        config.identity.token().map(|t| t.expose().to_string()),
        Some("resume-me".to_string())
    );
    assert_eq!(config.sync.pending_placement, PendingPlacement::First);
    assert_eq!(config.sync.resubscribe_max_attempts, 3);
    assert_eq!(config.sync.resubscribe_initial_backoff_ms, 100);
    assert_eq!(config.sync.resubscribe_max_backoff_ms, 1000);
    assert_eq!(
        config.collection_path().as_str(),
        "/artifacts/team-room/public/data/messages"
    );
}

/// Partial sections keep the defaults for missing keys.
#[test]
fn partial_section_keeps_defaults() {
    let config = load_config_from_str("[app]\nid = \"solo\"\n").expect("should load");
    assert_eq!(config.app.id, "solo");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.backend.project_id, "DEMO");
}

/// Unknown keys produce an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_in_sync_suggests_correction() {
    let toml = r#"
[sync]
pending_placment = "last"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "pending_placment");
            assert_eq!(suggestion.as_deref(), Some("pending_placement"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[bakend]\napi_key = \"x\"\n")
        .expect_err("should reject unknown section");
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "bakend"));
}

/// A bad enum value names the accepted values.
#[test]
fn invalid_pending_placement_lists_choices() {
    let errors = load_and_validate_str("[sync]\npending_placement = \"middle\"\n")
        .expect_err("should reject bad variant");
    let rendered = errors[0].to_string();
    assert!(rendered.contains("middle"), "got: {rendered}");
}

/// Wrong value types are reported as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[sync]\nresubscribe_max_attempts = \"many\"\n")
        .expect_err("should reject wrong type");
    assert!(matches!(&errors[0], ConfigError::InvalidType { .. }));
}

/// Semantic validation runs after deserialization.
#[test]
fn validation_errors_surface_through_load() {
    let errors = load_and_validate_str("[app]\nid = \"\"\n").expect_err("should reject");
    assert!(matches!(&errors[0], ConfigError::Validation { .. }));
}

/// Default config serializes and parses back to the same values.
#[test]
fn default_config_survives_toml() {
    let rendered = toml::to_string_pretty(&ParleyConfig::default()).expect("should serialize");
    let config = load_config_from_str(&rendered).expect("should parse back");
    assert_eq!(config.app.id, "default-chat-app");
    assert_eq!(config.sync.pending_placement, PendingPlacement::Last);
}

/// A config file on disk is loaded and environment variables override it.
#[test]
#[serial]
fn file_then_env_override() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[app]\nid = \"from-file\"\n\n[sync]\npending_placement = \"first\"")
        .expect("write config");

    // SAFETY: env mutation is serialized by #[serial].
    unsafe {
        std::env::set_var("PARLEY_APP_ID", "from-env");
        std::env::set_var("PARLEY_BACKEND_JSON", "{\"ignored\":true}");
    }
    let result = load_and_validate_path(file.path());
    unsafe {
        std::env::remove_var("PARLEY_APP_ID");
        std::env::remove_var("PARLEY_BACKEND_JSON");
    }

    let config = result.expect("should load");
    assert_eq!(config.app.id, "from-env");
    assert_eq!(config.sync.pending_placement, PendingPlacement::First);
}

/// A file with a typo reports the key from that file.
#[test]
#[serial]
fn file_with_typo_is_reported() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[identity]\ncontinuation_tokn = \"x\"").expect("write config");

    let errors = load_and_validate_path(file.path()).expect_err("should reject");
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "continuation_tokn");
            assert_eq!(suggestion.as_deref(), Some("continuation_token"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
