// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Credential Lifecycle
//!
//! The agent proves its identity to the manager with a single opaque bearer
//! token. [`CredentialLifecycle`] is the one slot that holds it:
//!
//! | State | Holds a credential | Entered by |
//! |-------|--------------------|------------|
//! | `Absent` | no | startup, empty store |
//! | `Pending` | yes | locally generated or restored key awaiting manager confirmation |
//! | `Valid` | yes | `Accepted` registration, or a restored server-issued key |
//! | `Invalidated` | no | manager rejected the key (401) |
//!
//! Every transition replaces the slot wholesale, so two credentials can never
//! be held at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters of a credential that may appear in logs.
const VISIBLE_PREFIX: usize = 8;

/// Opaque bearer token issued by the manager or generated locally.
///
/// `Debug` and `Display` only ever render a short prefix.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token. Blank tokens are not credentials.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Generate a fresh random candidate key (UUIDv4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The full token, for the authorization header and persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialState {
    Absent,
    Pending,
    Valid,
    Invalidated,
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialState::Absent => "absent",
            CredentialState::Pending => "pending",
            CredentialState::Valid => "valid",
            CredentialState::Invalidated => "invalidated",
        };
        f.write_str(s)
    }
}

/// Single-slot holder for the process credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialLifecycle {
    state: CredentialState,
    credential: Option<Credential>,
}

impl CredentialLifecycle {
    pub fn new() -> Self {
        Self {
            state: CredentialState::Absent,
            credential: None,
        }
    }

    pub fn state(&self) -> CredentialState {
        self.state
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The credential, only when the manager has confirmed it.
    pub fn valid_credential(&self) -> Option<&Credential> {
        match self.state {
            CredentialState::Valid => self.credential.as_ref(),
            _ => None,
        }
    }

    /// Hold a credential that still needs manager confirmation.
    pub fn propose(&mut self, credential: Credential) {
        self.replace(CredentialState::Pending, Some(credential));
    }

    /// Hold a credential the manager has confirmed (or that is trusted as
    /// confirmed, such as a restored server-issued key).
    pub fn confirm(&mut self, credential: Credential) {
        self.replace(CredentialState::Valid, Some(credential));
    }

    /// Drop the held credential after a manager rejection, returning it.
    pub fn invalidate(&mut self) -> Option<Credential> {
        let previous = self.credential.take();
        self.replace(CredentialState::Invalidated, None);
        previous
    }

    /// Drop the held credential without it having been rejected.
    pub fn discard(&mut self) -> Option<Credential> {
        let previous = self.credential.take();
        self.replace(CredentialState::Absent, None);
        previous
    }

    fn replace(&mut self, state: CredentialState, credential: Option<Credential>) {
        debug_assert_eq!(
            credential.is_some(),
            matches!(state, CredentialState::Pending | CredentialState::Valid)
        );
        self.state = state;
        self.credential = credential;
    }
}

impl Default for CredentialLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holds_credential_iff_live(lifecycle: &CredentialLifecycle) -> bool {
        lifecycle.credential().is_some()
            == matches!(lifecycle.state(), CredentialState::Pending | CredentialState::Valid)
    }

    #[test]
    fn test_blank_token_is_not_a_credential() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" K1 ").unwrap().expose(), "K1");
    }

    #[test]
    fn test_debug_and_display_are_redacted() {
        let credential = Credential::new("0123456789abcdef").unwrap();
        assert_eq!(credential.to_string(), "01234567...");
        assert!(!format!("{:?}", credential).contains("89abcdef"));
    }

    #[test]
    fn test_generated_keys_are_unique_uuids() {
        let a = Credential::generate();
        let b = Credential::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.expose()).is_ok());
    }

    #[test]
    fn test_transitions_replace_the_single_slot() {
        let mut lifecycle = CredentialLifecycle::new();
        assert_eq!(lifecycle.state(), CredentialState::Absent);
        assert!(holds_credential_iff_live(&lifecycle));

        lifecycle.propose(Credential::new("candidate").unwrap());
        assert_eq!(lifecycle.state(), CredentialState::Pending);
        assert!(lifecycle.valid_credential().is_none());
        assert!(holds_credential_iff_live(&lifecycle));

        lifecycle.confirm(Credential::new("K1").unwrap());
        assert_eq!(lifecycle.state(), CredentialState::Valid);
        assert_eq!(lifecycle.valid_credential().unwrap().expose(), "K1");
        assert!(holds_credential_iff_live(&lifecycle));

        let rejected = lifecycle.invalidate();
        assert_eq!(rejected.unwrap().expose(), "K1");
        assert_eq!(lifecycle.state(), CredentialState::Invalidated);
        assert!(lifecycle.credential().is_none());
        assert!(holds_credential_iff_live(&lifecycle));

        lifecycle.confirm(Credential::new("K2").unwrap());
        assert_eq!(lifecycle.credential().unwrap().expose(), "K2");

        assert!(lifecycle.discard().is_some());
        assert_eq!(lifecycle.state(), CredentialState::Absent);
        assert!(holds_credential_iff_live(&lifecycle));
    }
}
