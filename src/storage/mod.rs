mod local_storage;
mod s3_storage;

pub use local_storage::LocalBlobStore;
pub use s3_storage::S3BlobStore;

use crate::config::{BlobBackend, BlobSettings};
use crate::error::BlobError;
use std::sync::Arc;

/// Key-addressed payload storage.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;
}

pub async fn build_blob_store(settings: &BlobSettings) -> Result<Arc<dyn BlobStore>, BlobError> {
    match settings.backend {
        BlobBackend::Local => Ok(Arc::new(LocalBlobStore::new(settings.local_root.clone())?)),
        BlobBackend::S3 => {
            let bucket = settings
                .s3_bucket
                .clone()
                .ok_or_else(|| BlobError::S3Config("missing bucket".to_string()))?;
            let region = settings
                .s3_region
                .clone()
                .ok_or_else(|| BlobError::S3Config("missing region".to_string()))?;
            Ok(Arc::new(S3BlobStore::new(region, bucket).await))
        }
    }
}
