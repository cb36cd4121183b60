// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! OS-native secure credential store backed by the `keyring` crate.
//!
//! Keyring calls block on platform APIs, so each operation runs on the
//! blocking pool.

use async_trait::async_trait;

use crate::domain::credential::Credential;
use crate::domain::store::{CredentialStore, StoreError};

pub struct KeyringCredentialStore {
    service: String,
    entry: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entry: entry.into(),
        }
    }

    async fn with_entry<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(::keyring::Entry) -> Result<T, ::keyring::Error> + Send + 'static,
    {
        let service = self.service.clone();
        let entry = self.entry.clone();

        tokio::task::spawn_blocking(move || {
            let entry = ::keyring::Entry::new(&service, &entry)?;
            op(entry)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("keyring task failed: {}", e)))?
        .map_err(map_keyring_error)
    }
}

fn map_keyring_error(err: ::keyring::Error) -> StoreError {
    match err {
        ::keyring::Error::NoStorageAccess(inner) => StoreError::PermissionDenied(inner.to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        self.with_entry(|entry| match entry.get_password() {
            Ok(token) => Ok(Credential::new(token)),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let token = credential.expose().to_string();
        self.with_entry(move |entry| entry.set_password(&token)).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.with_entry(|entry| match entry.delete_credential() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }

    fn describe(&self) -> String {
        format!("keyring:{}/{}", self.service, self.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> KeyringCredentialStore {
        KeyringCredentialStore::new(
            "fleet-agent-test",
            format!("agent-key-{}", uuid::Uuid::new_v4()),
        )
    }

    #[tokio::test]
    #[ignore = "requires an unlocked OS credential store (Secret Service, Keychain or Credential Manager)"]
    async fn test_keyring_round_trip_and_clear() {
        let store = scratch_store();
        assert_eq!(store.load().await.unwrap(), None);

        let credential = Credential::new("K1-keyring").unwrap();
        store.save(&credential).await.unwrap();

        let reopened = KeyringCredentialStore::new(&store.service, &store.entry);
        assert_eq!(reopened.load().await.unwrap(), Some(credential));

        reopened.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[test]
    fn test_describe_names_service_and_entry() {
        let store = KeyringCredentialStore::new("fleet-agent", "agent-key");
        assert_eq!(store.describe(), "keyring:fleet-agent/agent-key");
    }
}
