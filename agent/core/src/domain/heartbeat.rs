// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use super::directive::Directive;

/// Result of one authenticated heartbeat call.
///
/// An authentication rejection is deliberately not a [`Directive`]: it is a
/// credential state transition the loop has to perform itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Directive(Directive),

    /// The manager no longer recognises the credential (HTTP 401).
    CredentialInvalid,

    /// The call did not produce a usable answer; retried next cycle.
    TransportFailure(String),
}

impl HeartbeatOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            HeartbeatOutcome::Directive(directive) => directive.label(),
            HeartbeatOutcome::CredentialInvalid => "credential_invalid",
            HeartbeatOutcome::TransportFailure(_) => "transport_failure",
        }
    }
}
