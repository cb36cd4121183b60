// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `fleet-agent run`: wire configuration into the agent loop and drive it
//! until a shutdown directive or a process signal.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use fleet_agent_core::application::{AgentLoop, CommandHandler, IntervalTicker, LoopExit};
use fleet_agent_core::domain::node_config::AgentConfig;
use fleet_agent_core::domain::platform::{Autostart, NotificationSink};
use fleet_agent_core::infrastructure::credential_store;
use fleet_agent_core::infrastructure::platform::{CommandShutdown, DesktopNotifier, LogNotifier};
use fleet_agent_core::infrastructure::HttpManagerClient;

use crate::service::ServiceAutostart;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = AgentConfig::load_or_default(config_path.clone())
        .context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    if config.spec.autostart.enabled {
        register_autostart(config_path).await;
    }

    let mut agent = build_agent(&config)?;

    let token = agent.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Signal received, stopping after the current cycle");
        token.cancel();
    });

    match agent.run().await {
        LoopExit::Shutdown => info!("Agent stopped: OS shutdown scheduled"),
        LoopExit::Cancelled => info!("Agent stopped"),
    }

    Ok(())
}

/// Assemble the agent loop from a validated configuration.
pub fn build_agent(config: &AgentConfig) -> Result<AgentLoop> {
    let spec = &config.spec;

    let identity = config.identity()?;
    let store = credential_store::from_config(&spec.credential_store)
        .context("Failed to initialize credential store")?;
    let client = Arc::new(
        HttpManagerClient::new(&spec.manager).context("Failed to create manager client")?,
    );

    let notifier: Arc<dyn NotificationSink> = if spec.notifications.enabled {
        Arc::new(DesktopNotifier::new())
    } else {
        Arc::new(LogNotifier)
    };
    let handler = CommandHandler::new(
        spec.shutdown.clone(),
        notifier,
        Arc::new(CommandShutdown::new()),
    );

    Ok(AgentLoop::new(
        identity,
        spec.manager.key_origin,
        store,
        client.clone(),
        client,
        handler,
        Arc::new(IntervalTicker::new(spec.heartbeat.interval())),
    ))
}

async fn register_autostart(config_path: Option<PathBuf>) {
    let config_path = config_path.and_then(|p| std::fs::canonicalize(p).ok());

    let result = tokio::task::spawn_blocking(move || {
        ServiceAutostart::for_current_exe(config_path)?.register()
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Autostart registration failed, continuing"),
        Err(e) => warn!(error = %e, "Autostart registration task failed, continuing"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_agent_core::domain::credential::CredentialState;

    #[test]
    fn test_build_agent_from_config() {
        let config = AgentConfig::from_yaml_str(
            r#"
apiVersion: fleet-agent/v1
kind: AgentConfig
metadata:
  name: test
spec:
  manager:
    endpoint: "http://127.0.0.1:9/api/manager"
  identity:
    hostname: "lab01--pc07"
  credential_store:
    backend: memory
  notifications:
    enabled: false
"#,
        )
        .unwrap();

        let agent = build_agent(&config).unwrap();
        assert_eq!(agent.identity().hostname(), "lab01--pc07");
        assert_eq!(agent.identity().group(), "lab01");
        assert_eq!(agent.lifecycle().state(), CredentialState::Absent);
    }
}
