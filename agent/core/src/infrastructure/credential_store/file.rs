// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Flat-file credential store.
//!
//! The file holds the bare token and nothing else. Writes go through a
//! sibling temp file and a rename so a crash mid-write never leaves a
//! truncated credential behind.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::credential::Credential;
use crate::domain::store::{CredentialStore, StoreError};

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn map_io(&self, err: std::io::Error) -> StoreError {
        match err.kind() {
            ErrorKind::PermissionDenied => {
                StoreError::PermissionDenied(self.path.display().to_string())
            }
            _ => StoreError::Io(err),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credential".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Credential::new(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.map_io(e)),
        }
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.map_io(e))?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, credential.expose())
            .await
            .map_err(|e| self.map_io(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.map_io(e))?;
        }

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.map_io(e))?;

        tracing::debug!(path = %self.path.display(), "Credential written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.map_io(e)),
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("agent.key"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_survives_a_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("agent.key");

        let store = FileCredentialStore::new(&path);
        store.save(&Credential::new("K1").unwrap()).await.unwrap();

        // Simulate a process restart
        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.load().await.unwrap().unwrap().expose(), "K1");
        assert!(!temp_dir.path().join("nested").join("agent.key.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_credential() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("agent.key"));

        store.save(&Credential::new("K1").unwrap()).await.unwrap();
        store.save(&Credential::new("K2").unwrap()).await.unwrap();

        assert_eq!(store.load().await.unwrap().unwrap().expose(), "K2");
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("agent.key"));

        store.save(&Credential::new("K1").unwrap()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.key");
        std::fs::write(&path, "\n").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.key");
        let store = FileCredentialStore::new(&path);
        store.save(&Credential::new("K1").unwrap()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
