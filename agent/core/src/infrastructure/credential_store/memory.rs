// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::credential::Credential;
use crate::domain::store::{CredentialStore, StoreError};

/// Process-local store. Used for tests and for agents that deliberately
/// re-register on every start.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }

    pub fn current(&self) -> Option<Credential> {
        self.slot.read().clone()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.slot.read().clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.slot.write() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write() = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
