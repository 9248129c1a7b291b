// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use parley_core::{CollectionPath, ContinuationToken, ParleyError, PendingPlacement};
use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Every section is optional and falls back to the standalone defaults, so a
/// bare `parley chat` works against the loopback backend with no files present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Application instance settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Backend connection credentials.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Identity resumption settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Ordering and subscription policy.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl ParleyConfig {
    /// The message collection this instance reads and writes.
    pub fn collection_path(&self) -> CollectionPath {
        CollectionPath::for_app(&self.app.id)
    }

    /// A copy with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.backend.api_key = mask(&copy.backend.api_key);
        copy.identity.continuation_token = copy.identity.continuation_token.as_deref().map(mask);
        copy
    }
}

fn mask(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        let head: String = secret.chars().take(4).collect();
        format!("{head}****")
    }
}

/// Application instance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Instance identifier used to scope the collection path.
    #[serde(default = "default_app_id")]
    pub id: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            id: default_app_id(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_id() -> String {
    "default-chat-app".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Structured backend connection credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default = "default_demo")]
    pub api_key: String,

    #[serde(default = "default_demo")]
    pub auth_domain: String,

    #[serde(default = "default_demo")]
    pub project_id: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: default_demo(),
            auth_domain: default_demo(),
            project_id: default_demo(),
        }
    }
}

fn default_demo() -> String {
    "DEMO".to_string()
}

/// Credentials blob as handed over by a hosting environment.
///
/// Hosts pass more keys than we use (storage bucket, app id, ...); those are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostedBackend {
    api_key: String,
    #[serde(default)]
    auth_domain: Option<String>,
    project_id: String,
}

impl BackendConfig {
    /// Parses a JSON credentials blob supplied by the hosting environment.
    pub fn from_json(json: &str) -> Result<Self, ParleyError> {
        let hosted: HostedBackend = serde_json::from_str(json).map_err(|e| {
            ParleyError::Initialization(format!("backend credentials are not valid JSON: {e}"))
        })?;
        Ok(Self {
            auth_domain: hosted
                .auth_domain
                .unwrap_or_else(|| format!("{}.example.invalid", hosted.project_id)),
            api_key: hosted.api_key,
            project_id: hosted.project_id,
        })
    }
}

/// Identity configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Token for resuming a prior identity. `None` signs in anonymously.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

impl IdentityConfig {
    pub fn token(&self) -> Option<ContinuationToken> {
        self.continuation_token
            .as_deref()
            .map(ContinuationToken::new)
    }
}

/// Ordering and live-subscription policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Placement of not-yet-committed messages in the ordered view.
    #[serde(default)]
    pub pending_placement: PendingPlacement,

    /// How many times to reopen a closed feed. 0 leaves reconnection to the store.
    #[serde(default)]
    pub resubscribe_max_attempts: u32,

    /// Delay before the first resubscribe attempt, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub resubscribe_initial_backoff_ms: u64,

    /// Upper bound for the doubling backoff, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub resubscribe_max_backoff_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pending_placement: PendingPlacement::default(),
            resubscribe_max_attempts: 0,
            resubscribe_initial_backoff_ms: default_initial_backoff_ms(),
            resubscribe_max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl SyncConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.resubscribe_initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.resubscribe_max_backoff_ms)
    }
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standalone_fallbacks() {
        let config = ParleyConfig::default();
        assert_eq!(config.app.id, "default-chat-app");
        assert_eq!(config.app.log_level, "info");
        assert_eq!(config.backend.api_key, "DEMO");
        assert_eq!(config.backend.auth_domain, "DEMO");
        assert_eq!(config.backend.project_id, "DEMO");
        assert!(config.identity.continuation_token.is_none());
        assert_eq!(config.sync.pending_placement, PendingPlacement::Last);
        assert_eq!(config.sync.resubscribe_max_attempts, 0);
    }

    #[test]
    fn collection_path_uses_app_id() {
        let mut config = ParleyConfig::default();
        config.app.id = "team-room".into();
        assert_eq!(
            config.collection_path().as_str(),
            "/artifacts/team-room/public/data/messages"
        );
    }

    #[test]
    fn backend_from_hosted_json() {
        let json = r#"{"apiKey":"AIza123","authDomain":"demo.example.com","projectId":"demo","storageBucket":"x"}"#;
        let backend = BackendConfig::from_json(json).expect("should parse");
        assert_eq!(backend.api_key, "AIza123");
        assert_eq!(backend.auth_domain, "demo.example.com");
        assert_eq!(backend.project_id, "demo");
    }

    #[test]
    fn backend_from_malformed_json_is_initialization_failure() {
        let err = BackendConfig::from_json("{not json").expect_err("should fail");
        assert!(matches!(err, ParleyError::Initialization(_)));
    }

    #[test]
    fn backend_from_json_missing_project_fails() {
        let err = BackendConfig::from_json(r#"{"apiKey":"k"}"#).expect_err("should fail");
        assert!(err.to_string().contains("projectId"));
    }

    #[test]
    fn redacted_masks_credentials() {
        let mut config = ParleyConfig::default();
        config.backend.api_key = "AIzaSyVerySecret".into();
        config.identity.continuation_token = Some("tok".into());
        let shown = config.redacted();
        assert_eq!(shown.backend.api_key, "AIza****");
        assert_eq!(shown.identity.continuation_token.as_deref(), Some("****"));
    }

    #[test]
    fn sync_backoff_durations() {
        let sync = SyncConfig::default();
        assert_eq!(sync.initial_backoff(), Duration::from_millis(500));
        assert_eq!(sync.max_backoff(), Duration::from_secs(30));
    }
}
