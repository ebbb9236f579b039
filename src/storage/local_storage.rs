use crate::error::BlobError;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

use super::BlobStore;

/// Blob store backed by a directory tree; keys map to relative paths.
pub struct LocalBlobStore {
    storage_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(storage_path: PathBuf) -> Result<Self, BlobError> {
        fs::create_dir_all(&storage_path).map_err(BlobError::DirectoryCreation)?;
        Ok(Self { storage_path })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let is_plain = key
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | "..") && !segment.contains('\\'));
        if !is_plain {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.storage_path.join(key))
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let file_path = self.resolve(key)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BlobError::DirectoryCreation)?;
        }
        tokio::fs::write(&file_path, data)
            .await
            .map_err(|e| BlobError::Write(format!("{}: {}", file_path.display(), e)))?;

        info!("Saved payload locally: {:?}", file_path);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let file_path = self.resolve(key)?;
        tokio::fs::read(&file_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobError::NotFound(key.to_string()),
            _ => BlobError::Read(format!("{}: {}", file_path.display(), e)),
        })
    }
}
