use crate::error::BlobError;
use crate::fetch_id::blob_key;
use crate::storage::BlobStore;
use std::sync::Arc;

/// Looks up stored payloads by fetch id. Never consults the record log.
#[derive(Clone)]
pub struct PayloadService {
    blobs: Arc<dyn BlobStore>,
    prefix: String,
}

impl PayloadService {
    pub fn new(blobs: Arc<dyn BlobStore>, prefix: String) -> Self {
        Self { blobs, prefix }
    }

    pub async fn fetch(&self, log_id: &str) -> Result<String, BlobError> {
        let data = self.blobs.get(&blob_key(&self.prefix, log_id)).await?;
        Ok(String::from_utf8(data)?)
    }
}
