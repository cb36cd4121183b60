// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Loop
//!
//! Single cooperative sequence of cycles. Each cycle makes at most one manager
//! call, then the loop waits on the [`Ticker`]:
//!
//! ```text
//! NoCredential ──register──▶ Registered ──heartbeat──▶ Registered
//!      ▲   │ pending/failed        │ 401                │ shutdown
//!      │   └───────────────┐       ▼                    ▼
//!      └────────────────── NoCredential            ShuttingDown (exit)
//! ```
//!
//! The loop owns the [`CredentialLifecycle`] and is the only component that
//! changes it. The store is consulted only while the slot is `Absent`; after a
//! rejection (`Invalidated`) the loop goes straight to registration so a
//! store that failed to clear cannot resurrect the rejected key.
//!
//! Exits: a `Shutdown` directive, or the cancellation token (process signal).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::command_handler::{CommandHandler, LoopControl};
use super::scheduler::Ticker;
use crate::domain::credential::{Credential, CredentialLifecycle, CredentialState};
use crate::domain::heartbeat::HeartbeatOutcome;
use crate::domain::identity::IdentityContext;
use crate::domain::manager::{HeartbeatClient, RegistrationClient};
use crate::domain::registration::{KeyOrigin, RegistrationOutcome};
use crate::domain::store::CredentialStore;

/// Observable result of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Registered,
    RegistrationPending,
    RegistrationFailed,
    HeartbeatAcknowledged,
    CredentialRejected,
    HeartbeatFailed,
    ShutdownScheduled,
}

/// Why [`AgentLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Shutdown,
    Cancelled,
}

pub struct AgentLoop {
    identity: IdentityContext,
    key_origin: KeyOrigin,
    store: Arc<dyn CredentialStore>,
    registrar: Arc<dyn RegistrationClient>,
    heartbeat: Arc<dyn HeartbeatClient>,
    handler: CommandHandler,
    ticker: Arc<dyn Ticker>,
    shutdown_token: CancellationToken,
    lifecycle: CredentialLifecycle,
}

impl AgentLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: IdentityContext,
        key_origin: KeyOrigin,
        store: Arc<dyn CredentialStore>,
        registrar: Arc<dyn RegistrationClient>,
        heartbeat: Arc<dyn HeartbeatClient>,
        handler: CommandHandler,
        ticker: Arc<dyn Ticker>,
    ) -> Self {
        Self {
            identity,
            key_origin,
            store,
            registrar,
            heartbeat,
            handler,
            ticker,
            shutdown_token: CancellationToken::new(),
            lifecycle: CredentialLifecycle::new(),
        }
    }

    /// Get a handle to stop the loop at the next cycle boundary
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    pub fn lifecycle(&self) -> &CredentialLifecycle {
        &self.lifecycle
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Run cycles until a shutdown directive or cancellation.
    pub async fn run(&mut self) -> LoopExit {
        info!(
            hostname = %self.identity.hostname(),
            group = %self.identity.group(),
            manager = %self.identity.manager_endpoint(),
            key_origin = %self.key_origin,
            store = %self.store.describe(),
            "Starting agent loop"
        );

        loop {
            if self.shutdown_token.is_cancelled() {
                info!("Cancellation requested, stopping agent loop");
                return LoopExit::Cancelled;
            }

            let outcome = self.run_cycle().await;
            debug!(?outcome, state = %self.lifecycle.state(), "Cycle finished");

            if outcome == CycleOutcome::ShutdownScheduled {
                info!("Shutdown scheduled, stopping agent loop");
                return LoopExit::Shutdown;
            }

            tokio::select! {
                _ = self.ticker.wait() => {}
                _ = self.shutdown_token.cancelled() => {
                    info!("Cancellation requested, stopping agent loop");
                    return LoopExit::Cancelled;
                }
            }
        }
    }

    /// Execute a single cycle: heartbeat when a confirmed credential is held,
    /// otherwise register.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.restore_from_store().await;

        match self.lifecycle.valid_credential().cloned() {
            Some(credential) => self.send_heartbeat(credential).await,
            None => self.register().await,
        }
    }

    async fn restore_from_store(&mut self) {
        if self.lifecycle.state() != CredentialState::Absent {
            return;
        }

        match self.store.load().await {
            Ok(Some(credential)) => match self.key_origin {
                KeyOrigin::Server => {
                    info!(credential = %credential, "Credential loaded from store");
                    self.lifecycle.confirm(credential);
                }
                KeyOrigin::Client => {
                    info!(credential = %credential, "Existing key found, validating with manager");
                    self.lifecycle.propose(credential);
                }
            },
            Ok(None) => debug!("No stored credential"),
            Err(e) => warn!(
                error = %e,
                store = %self.store.describe(),
                "Failed to read credential store, continuing without a stored credential"
            ),
        }
    }

    /// Candidate key to send with a registration, minting and persisting a
    /// fresh one when none is pending.
    async fn candidate(&mut self) -> Option<Credential> {
        match self.key_origin {
            KeyOrigin::Server => None,
            KeyOrigin::Client => {
                if self.lifecycle.state() == CredentialState::Pending {
                    return self.lifecycle.credential().cloned();
                }

                let candidate = Credential::generate();
                info!(credential = %candidate, "Generated new local key");
                self.lifecycle.propose(candidate.clone());
                self.persist(&candidate).await;
                Some(candidate)
            }
        }
    }

    async fn register(&mut self) -> CycleOutcome {
        let candidate = self.candidate().await;

        info!(
            hostname = %self.identity.hostname(),
            group = %self.identity.group(),
            "Registering with manager"
        );

        let outcome = self
            .registrar
            .register(&self.identity, candidate.as_ref())
            .await;

        metrics::counter!("fleet_agent_registrations_total", "outcome" => outcome.label())
            .increment(1);

        match outcome {
            RegistrationOutcome::Accepted { credential, id } => {
                info!(
                    credential = %credential,
                    id = id.as_deref().unwrap_or("-"),
                    "Registration accepted by manager"
                );
                self.lifecycle.confirm(credential.clone());
                self.persist(&credential).await;
                CycleOutcome::Registered
            }
            RegistrationOutcome::PendingApproval => {
                info!("Registration awaiting manager approval");
                CycleOutcome::RegistrationPending
            }
            RegistrationOutcome::Rejected(reason) => {
                warn!(reason = %reason, "Registration failed, retrying next cycle");
                CycleOutcome::RegistrationFailed
            }
        }
    }

    async fn send_heartbeat(&mut self, credential: Credential) -> CycleOutcome {
        let outcome = self.heartbeat.beat(&self.identity, &credential).await;

        metrics::counter!("fleet_agent_heartbeats_total", "outcome" => outcome.label())
            .increment(1);

        match outcome {
            HeartbeatOutcome::Directive(directive) => match self.handler.handle(&directive) {
                LoopControl::Proceed => CycleOutcome::HeartbeatAcknowledged,
                LoopControl::Terminate => CycleOutcome::ShutdownScheduled,
            },
            HeartbeatOutcome::CredentialInvalid => {
                warn!(credential = %credential, "Manager rejected the credential (401), clearing it");
                self.lifecycle.invalidate();
                metrics::counter!("fleet_agent_credential_invalidations_total").increment(1);

                if let Err(e) = self.store.clear().await {
                    warn!(
                        error = %e,
                        store = %self.store.describe(),
                        "Failed to remove rejected credential from store"
                    );
                }
                CycleOutcome::CredentialRejected
            }
            HeartbeatOutcome::TransportFailure(reason) => {
                warn!(reason = %reason, "Heartbeat failed, retrying next cycle");
                CycleOutcome::HeartbeatFailed
            }
        }
    }

    async fn persist(&self, credential: &Credential) {
        match self.store.save(credential).await {
            Ok(()) => debug!(store = %self.store.describe(), "Credential persisted"),
            Err(e) => warn!(
                error = %e,
                store = %self.store.describe(),
                "Failed to persist credential, agent will re-register after restart"
            ),
        }
    }
}
