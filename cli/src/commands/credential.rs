// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Credential commands: show, clear

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use fleet_agent_core::domain::node_config::AgentConfig;
use fleet_agent_core::domain::store::CredentialStore;
use fleet_agent_core::infrastructure::credential_store;

#[derive(Subcommand)]
pub enum CredentialCommand {
    /// Show the stored credential (redacted)
    Show,

    /// Remove the stored credential; the agent re-registers on its next cycle
    Clear,
}

pub async fn handle_command(
    command: CredentialCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    let config = AgentConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;
    let store = credential_store::from_config(&config.spec.credential_store)?;

    match command {
        CredentialCommand::Show => show(store).await,
        CredentialCommand::Clear => clear(store).await,
    }
}

async fn show(store: Arc<dyn CredentialStore>) -> Result<()> {
    println!("{} {}", "Store:".bold(), store.describe());

    match store
        .load()
        .await
        .with_context(|| format!("Failed to read credential from {}", store.describe()))?
    {
        Some(credential) => println!("{} {}", "Credential:".bold(), credential.redacted()),
        None => println!("{} {}", "Credential:".bold(), "(none)".dimmed()),
    }

    Ok(())
}

async fn clear(store: Arc<dyn CredentialStore>) -> Result<()> {
    store
        .clear()
        .await
        .with_context(|| format!("Failed to clear credential from {}", store.describe()))?;

    println!(
        "{}",
        format!("✓ Credential cleared: {}", store.describe()).green()
    );

    Ok(())
}
