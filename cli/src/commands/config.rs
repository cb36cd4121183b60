// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fleet_agent_core::domain::node_config::{AgentConfig, CredentialBackend, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./fleet-agent.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = AgentConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  --config flag: {}", path.display());
        } else {
            println!("  --config flag: {}", "(not set)".dimmed());
        }
        for (index, path) in AgentConfig::search_paths().iter().enumerate() {
            let marker = if path.exists() { "found".green() } else { "missing".dimmed() };
            println!("  {}. {} [{}]", index + 1, path.display(), marker);
        }
        println!(
            "  ({}: {})",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "not set".to_string())
        );
        println!();
    }

    let spec = &config.spec;

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Manager:".bold());
    println!("  Endpoint: {}", spec.manager.endpoint);
    println!("  Timeout: {}s", spec.manager.timeout_seconds);
    println!("  Key origin: {}", spec.manager.key_origin);
    println!();

    println!("{}", "Identity:".bold());
    match config.identity() {
        Ok(identity) => {
            println!("  Hostname: {}", identity.hostname());
            println!("  Group: {}", identity.group());
        }
        Err(e) => println!("  {}", format!("unresolved: {}", e).yellow()),
    }
    println!();

    println!("{}", "Cycle:".bold());
    println!("  Heartbeat interval: {}s", spec.heartbeat.interval_seconds);
    println!("  Shutdown delay: {}s", spec.shutdown.delay_seconds);
    println!("  Notifications: {}", spec.notifications.enabled);
    println!("  Autostart: {}", spec.autostart.enabled);
    println!();

    println!("{}", "Credential store:".bold());
    match spec.credential_store.backend {
        CredentialBackend::File => {
            let path = spec
                .credential_store
                .resolved_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unresolved)".to_string());
            println!("  File: {}", path);
        }
        CredentialBackend::Keyring => println!(
            "  Keyring: {}/{}",
            spec.credential_store.service, spec.credential_store.entry
        ),
        CredentialBackend::Memory => println!("  Memory (not persisted)"),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = AgentConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = sample_config(with_examples);

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn sample_config(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_configs_parse_and_validate() {
        for with_examples in [false, true] {
            let config = AgentConfig::from_yaml_str(sample_config(with_examples)).unwrap();
            config.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("fleet-agent.yaml");

        generate(output.clone(), true).await.unwrap();

        let config = AgentConfig::from_yaml_file(&output).unwrap();
        assert_eq!(config.metadata.name, "lab01-workstations");
        assert_eq!(config.spec.heartbeat.interval_seconds, 10);
    }
}
