// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Credential Store Interface
//!
//! Durable home of the single agent credential, independent of the medium
//! (flat file, OS secure store, memory). Implementations live in
//! `crate::infrastructure::credential_store`.
//!
//! Failures are reported but callers treat them as non-fatal: an agent that
//! cannot persist keeps running and re-registers after the next restart.

use async_trait::async_trait;

use super::credential::Credential;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the persisted credential. "Not found" is `Ok(None)`, never an error.
    async fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Persist `credential`, replacing whatever was stored before.
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Remove the persisted credential. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Human-readable location for logs and the CLI.
    fn describe(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
