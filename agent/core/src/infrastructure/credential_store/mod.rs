// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Credential Store Media
//!
//! Implementations of [`CredentialStore`] selected at startup from
//! `credential_store.backend`:
//!
//! - **file:** single owner-only file (default)
//! - **keyring:** OS-native secure store (Windows Credential Manager, macOS
//!   Keychain, Linux keyutils persisted through the Secret Service)
//! - **memory:** process-local, lost on restart

use std::sync::Arc;

use anyhow::Result;

use crate::domain::node_config::{CredentialBackend, CredentialStoreConfig};
use crate::domain::store::CredentialStore;

pub mod file;
pub mod keyring;
pub mod memory;

pub use self::file::FileCredentialStore;
pub use self::keyring::KeyringCredentialStore;
pub use self::memory::InMemoryCredentialStore;

/// Build the configured credential store.
pub fn from_config(config: &CredentialStoreConfig) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.backend {
        CredentialBackend::File => {
            let path = config.resolved_path().ok_or_else(|| {
                anyhow::anyhow!("No credential file path configured and no platform default available")
            })?;
            Arc::new(FileCredentialStore::new(path))
        }
        CredentialBackend::Keyring => {
            Arc::new(KeyringCredentialStore::new(&config.service, &config.entry))
        }
        CredentialBackend::Memory => Arc::new(InMemoryCredentialStore::new()),
    };

    tracing::debug!(store = %store.describe(), "Credential store selected");
    Ok(store)
}
