//! Signed PDF storage.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// Directory, relative to the upload root, that holds signed documents.
pub const SIGNED_DOCUMENTS_DIR: &str = "signed";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage path escapes the upload directory: {0}")]
    InvalidPath(String),

    #[error("stored document not found")]
    NotFound,

    #[error("storage io error")]
    Io(#[source] io::Error),
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            return Self::NotFound;
        }

        Self::Io(error)
    }
}

#[automock]
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Write `bytes` at `relative_path`, replacing any previous file atomically.
    async fn store(&self, relative_path: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read back a stored document.
    async fn load(&self, relative_path: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete a stored document. Missing files are not an error.
    async fn remove(&self, relative_path: &str) -> Result<(), StorageError>;
}

/// Stores documents as files below an upload directory.
#[derive(Debug, Clone)]
pub struct FilesystemDocumentStorage {
    root: PathBuf,
}

impl FilesystemDocumentStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(relative_path);

        let is_contained = relative.components().next().is_some()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_contained {
            return Err(StorageError::InvalidPath(relative_path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStorage for FilesystemDocumentStorage {
    async fn store(&self, relative_path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(relative_path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
        }

        let mut staging = target.clone().into_os_string();

        staging.push(format!(".{}.partial", Uuid::now_v7().simple()));

        let staging = PathBuf::from(staging);

        if let Err(source) = fs::write(&staging, bytes).await {
            discard(&staging).await;

            return Err(StorageError::Io(source));
        }

        if let Err(source) = fs::rename(&staging, &target).await {
            discard(&staging).await;

            return Err(StorageError::Io(source));
        }

        Ok(())
    }

    async fn load(&self, relative_path: &str) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(self.resolve(relative_path)?).await?)
    }

    async fn remove(&self, relative_path: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.resolve(relative_path)?).await {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io(source)),
        }
    }
}

async fn discard(path: &Path) {
    if let Err(source) = fs::remove_file(path).await
        && source.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), "failed to remove partial upload: {source}");
    }
}
