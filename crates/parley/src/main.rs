// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a terminal client for a shared, append-only message stream.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_config::{BackendConfig, ConfigError, ParleyConfig};
use parley_core::ParleyError;

/// Parley - a terminal client for a shared, append-only message stream.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Join the conversation.
    Chat {
        /// Resume a previously established identity.
        #[arg(long)]
        token: Option<String>,

        /// Backend credentials as a JSON object.
        #[arg(long, env = "PARLEY_BACKEND_JSON")]
        backend_json: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Chat {
            token,
            backend_json,
        }) => {
            let config = match apply_overrides(config, token, backend_json.as_deref()) {
                Ok(config) => config,
                Err(OverrideError::Invalid(errors)) => {
                    parley_config::render_errors(&errors);
                    std::process::exit(1);
                }
                Err(OverrideError::Backend(e)) => {
                    eprintln!("parley: {e}");
                    std::process::exit(1);
                }
            };
            init_tracing(&config.app.log_level);
            if let Err(e) = chat::run_chat(config).await {
                eprintln!("parley: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config.redacted()) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("parley: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("parley: use --help for available commands");
        }
    }
}

#[derive(Debug)]
enum OverrideError {
    Backend(ParleyError),
    Invalid(Vec<ConfigError>),
}

/// Applies command-line overrides on top of the loaded configuration.
fn apply_overrides(
    mut config: ParleyConfig,
    token: Option<String>,
    backend_json: Option<&str>,
) -> Result<ParleyConfig, OverrideError> {
    if let Some(token) = token {
        config.identity.continuation_token = Some(token);
    }
    if let Some(json) = backend_json {
        config.backend = BackendConfig::from_json(json).map_err(OverrideError::Backend)?;
    }
    parley_config::validation::validate_config(&config).map_err(OverrideError::Invalid)?;
    Ok(config)
}

/// Initializes the tracing subscriber on stderr so logs stay out of the chat.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn chat_flags_parse() {
        let cli = Cli::try_parse_from([
            "parley",
            "chat",
            "--token",
            "resume-me",
            "--backend-json",
            r#"{"apiKey":"k","authDomain":"d","projectId":"p"}"#,
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Chat {
                token,
                backend_json,
            }) => {
                assert_eq!(token.as_deref(), Some("resume-me"));
                assert!(backend_json.unwrap().contains("projectId"));
            }
            other => panic!("expected chat command, got {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["parley", "config", "--config", "/tmp/p.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(matches!(cli.command, Some(Commands::Config)));
    }

    #[test]
    fn overrides_replace_token_and_backend() {
        let config = apply_overrides(
            ParleyConfig::default(),
            Some("tok-1".into()),
            Some(r#"{"apiKey":"key-123","authDomain":"example.test","projectId":"proj"}"#),
        )
        .unwrap();

        assert_eq!(config.identity.continuation_token.as_deref(), Some("tok-1"));
        assert_eq!(config.backend.project_id, "proj");
        assert_eq!(config.backend.api_key, "key-123");
    }

    #[test]
    fn malformed_backend_json_is_an_initialization_failure() {
        let err = apply_overrides(ParleyConfig::default(), None, Some("{not json")).unwrap_err();
        assert!(matches!(
            err,
            OverrideError::Backend(ParleyError::Initialization(_))
        ));
    }

    #[test]
    fn empty_token_override_fails_validation() {
        let err = apply_overrides(ParleyConfig::default(), Some(String::new()), None).unwrap_err();
        assert!(matches!(err, OverrideError::Invalid(ref errors) if !errors.is_empty()));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&ParleyConfig::default().redacted()).unwrap();
        assert!(rendered.contains("[app]"));
        assert!(rendered.contains("pending_placement = \"last\""));
    }
}
