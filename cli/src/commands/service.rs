// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Service commands: install, uninstall

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use crate::service::ServiceAutostart;

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Register the agent to start at boot
    Install {
        /// Path to fleet-agent binary (default: current executable)
        #[arg(long)]
        binary_path: Option<PathBuf>,
    },

    /// Remove the boot-time registration
    Uninstall,
}

pub async fn handle_command(command: ServiceCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ServiceCommand::Install { binary_path } => install(binary_path, config_override).await,
        ServiceCommand::Uninstall => uninstall().await,
    }
}

async fn install(binary_path: Option<PathBuf>, config_override: Option<PathBuf>) -> Result<()> {
    let config = config_override
        .map(|p| std::fs::canonicalize(&p).with_context(|| format!("Config file not found: {:?}", p)))
        .transpose()?;

    let autostart = match binary_path {
        Some(binary) => ServiceAutostart::new(binary, config),
        None => ServiceAutostart::for_current_exe(config)
            .context("Failed to determine current executable")?,
    };

    let location = tokio::task::spawn_blocking(move || autostart.install())
        .await
        .context("Service installation task panicked")?
        .context("Failed to install service")?;

    println!("{}", format!("✓ Service registered: {}", location).green());
    println!();
    println!("{}", "Service installed successfully!".bold().green());
    println!("The agent will start automatically on boot.");

    Ok(())
}

async fn uninstall() -> Result<()> {
    let autostart = ServiceAutostart::for_current_exe(None)
        .context("Failed to determine current executable")?;

    tokio::task::spawn_blocking(move || autostart.uninstall())
        .await
        .context("Service removal task panicked")?
        .context("Failed to uninstall service")?;

    println!("{}", "✓ Service uninstalled".green());

    Ok(())
}
