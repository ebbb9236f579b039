use crate::error::BlobError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client};
use tracing::info;

use super::BlobStore;

pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub async fn new(region: String, bucket: String) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::v2024_03_28())
            .region(Region::new(region))
            .load()
            .await;
        let client = Client::new(&config);

        Self { client, bucket }
    }
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| BlobError::Write(e.to_string()))?;

        info!("Uploaded payload to S3: {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let obj = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    BlobError::NotFound(key.to_string())
                } else {
                    BlobError::Read(err.to_string())
                }
            })?;

        let data = obj
            .body
            .collect()
            .await
            .map_err(|e| BlobError::Read(e.to_string()))?
            .into_bytes();

        Ok(data.to_vec())
    }
}
