// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let app_id = config.app.id.trim();
    if app_id.is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.id must not be empty".to_string(),
        });
    } else if app_id.contains('/') {
        errors.push(ConfigError::Validation {
            message: format!("app.id `{app_id}` must not contain `/`"),
        });
    }

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.app.log_level
            ),
        });
    }

    if config.backend.api_key.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.api_key must not be empty".to_string(),
        });
    }

    if config.backend.project_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.project_id must not be empty".to_string(),
        });
    }

    if let Some(token) = &config.identity.continuation_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "identity.continuation_token must not be empty when set".to_string(),
        });
    }

    let sync = &config.sync;
    if sync.resubscribe_initial_backoff_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.resubscribe_initial_backoff_ms must be greater than 0".to_string(),
        });
    }

    if sync.resubscribe_initial_backoff_ms > sync.resubscribe_max_backoff_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "sync.resubscribe_initial_backoff_ms ({}) must not exceed sync.resubscribe_max_backoff_ms ({})",
                sync.resubscribe_initial_backoff_ms, sync.resubscribe_max_backoff_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ParleyConfig::default()).is_ok());
    }

    #[test]
    fn slash_in_app_id_is_rejected() {
        let mut config = ParleyConfig::default();
        config.app.id = "a/b".into();
        let errors = validate_config(&config).expect_err("should reject");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("must not contain"));
    }

    #[test]
    fn all_failures_are_collected() {
        let mut config = ParleyConfig::default();
        config.app.id = "  ".into();
        config.app.log_level = "loud".into();
        config.backend.api_key = String::new();
        config.backend.project_id = String::new();
        config.identity.continuation_token = Some(" ".into());
        config.sync.resubscribe_initial_backoff_ms = 0;

        let errors = validate_config(&config).expect_err("should reject");
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn backoff_bounds_must_be_ordered() {
        let mut config = ParleyConfig::default();
        config.sync.resubscribe_initial_backoff_ms = 5_000;
        config.sync.resubscribe_max_backoff_ms = 1_000;
        let errors = validate_config(&config).expect_err("should reject");
        assert!(errors[0].to_string().contains("must not exceed"));
    }
}
