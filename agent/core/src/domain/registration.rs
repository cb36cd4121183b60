// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;

use super::credential::Credential;

/// Who mints the agent credential.
///
/// The two protocol variants disagree on who is authoritative for identity,
/// so the choice is an explicit configuration flag rather than inferred from
/// the manager's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrigin {
    /// The manager returns `key` in the registration response.
    #[default]
    Server,

    /// The agent generates a UUID candidate and sends it as `agentKey`.
    Client,
}

impl std::str::FromStr for KeyOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(KeyOrigin::Server),
            "client" => Ok(KeyOrigin::Client),
            other => Err(format!("unknown key origin '{}', expected server or client", other)),
        }
    }
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOrigin::Server => f.write_str("server"),
            KeyOrigin::Client => f.write_str("client"),
        }
    }
}

/// Result of one registration handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The manager accepted the agent. `id` is the manager-side record id,
    /// when it sent one.
    Accepted { credential: Credential, id: Option<String> },

    /// Waiting for an operator to approve the agent. Not an error.
    PendingApproval,

    /// The attempt failed; always retryable on the next cycle.
    Rejected(RegistrationRejection),
}

impl RegistrationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationOutcome::Accepted { .. } => "accepted",
            RegistrationOutcome::PendingApproval => "pending",
            RegistrationOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Why a registration attempt did not produce a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRejection {
    #[error("manager unreachable: {0}")]
    Transport(String),

    #[error("manager answered HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("invalid registration response: {0}")]
    InvalidResponse(String),
}
