// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Fleet Agent CLI
//!
//! The `fleet-agent` binary runs on each managed endpoint. It registers the
//! host with the fleet manager, heartbeats on a fixed interval and carries out
//! remote shutdown directives.
//!
//! ## Commands
//!
//! - `fleet-agent run` - Run the agent loop (default when no command is given)
//! - `fleet-agent config show|validate|generate` - Configuration management
//! - `fleet-agent credential show|clear` - Inspect or remove the stored credential
//! - `fleet-agent service install|uninstall` - Start the agent at boot

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fleet_agent::commands::{self, ConfigCommand, CredentialCommand, ServiceCommand};
use fleet_agent_core::domain::node_config::{AgentConfig, CONFIG_PATH_ENV};

/// Fleet Agent - endpoint registration and remote shutdown
#[derive(Parser)]
#[command(name = "fleet-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = CONFIG_PATH_ENV,
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true, env = "FLEET_AGENT_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent loop
    #[command(name = "run")]
    Run,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Stored credential management
    #[command(name = "credential")]
    Credential {
        #[command(subcommand)]
        command: CredentialCommand,
    },

    /// Boot-time autostart registration
    #[command(name = "service")]
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (level, format) = logging_settings(cli.config.clone(), cli.log_level.clone());
    init_logging(&level, &format)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Credential { command } => {
            commands::credential::handle_command(command, cli.config).await
        }
        Commands::Service { command } => commands::service::handle_command(command, cli.config).await,
    }
}

/// Resolve log level and format: CLI flag first, then the config file.
///
/// A config that fails to load here is reported later by the command itself.
fn logging_settings(config_path: Option<PathBuf>, cli_level: Option<String>) -> (String, String) {
    let logging = AgentConfig::load_or_default(config_path)
        .ok()
        .and_then(|config| config.spec.observability)
        .and_then(|observability| observability.logging)
        .unwrap_or_default();

    (cli_level.unwrap_or(logging.level), logging.format)
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
