// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Manager protocol interfaces.
//!
//! Both calls are infallible at the type level: every failure mode is a
//! variant of the returned outcome so that the loop is forced to decide what
//! each one means for the credential.

use async_trait::async_trait;

use super::credential::Credential;
use super::heartbeat::HeartbeatOutcome;
use super::identity::IdentityContext;
use super::registration::RegistrationOutcome;

#[async_trait]
pub trait RegistrationClient: Send + Sync {
    /// Exchange identity (and, for client-generated keys, the candidate) for
    /// a credential. Safe to call repeatedly.
    async fn register(
        &self,
        identity: &IdentityContext,
        candidate: Option<&Credential>,
    ) -> RegistrationOutcome;
}

#[async_trait]
pub trait HeartbeatClient: Send + Sync {
    /// Report liveness and receive the manager's directive.
    async fn beat(&self, identity: &IdentityContext, credential: &Credential) -> HeartbeatOutcome;
}
