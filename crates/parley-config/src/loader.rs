// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./parley.toml` > `~/.config/parley/parley.toml` > `/etc/parley/parley.toml`
//! with environment variable overrides via `PARLEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ParleyConfig;

/// File name looked up in each configuration directory.
pub const CONFIG_FILE: &str = "parley.toml";

/// Top-level sections, used to turn `PARLEY_SECTION_KEY` into `section.key`.
const SECTIONS: &[&str] = &["app", "backend", "identity", "sync"];

/// Env vars under the `PARLEY_` prefix that are not config keys.
const NON_CONFIG_VARS: &[&str] = &["backend_json"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parley/parley.toml` (system-wide)
/// 3. `~/.config/parley/parley.toml` (user XDG config)
/// 4. `./parley.toml` (local directory)
/// 5. `PARLEY_*` environment variables
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string layered over the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(Path::new("/etc/parley").join(CONFIG_FILE)))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("parley").join(CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `PARLEY_SYNC_PENDING_PLACEMENT` to `sync.pending_placement`.
///
/// Only the first underscore after the section name becomes a dot; key names
/// keep their own underscores.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_")
        .ignore(NON_CONFIG_VARS)
        .map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("app_log_level"), "app.log_level");
        assert_eq!(map_env_key("backend_api_key"), "backend.api_key");
        assert_eq!(
            map_env_key("identity_continuation_token"),
            "identity.continuation_token"
        );
        assert_eq!(
            map_env_key("sync_resubscribe_max_attempts"),
            "sync.resubscribe_max_attempts"
        );
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("bogus_key"), "bogus_key");
        assert_eq!(map_env_key("application"), "application");
    }

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").expect("defaults should load");
        assert_eq!(config.app.id, "default-chat-app");
    }
}
