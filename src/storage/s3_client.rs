use std::time::Duration;

use aws_config::{retry::RetryConfig, BehaviorVersion, Region};
use aws_sdk_s3::{
    config::Credentials, error::SdkError, presigning::PresigningConfig,
    primitives::ByteStream, Client,
};
use thiserror::Error;

use crate::config::StorageConfig;

/// Lifetime of pre-signed download URLs.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// Transport-level retry budget for the S3 client.
const MAX_RETRY_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage rejected request: {0}")]
    Rejected(String),
}

impl StorageError {
    fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match &err {
            SdkError::ServiceError(_) => StorageError::Rejected(err.to_string()),
            _ => StorageError::Unavailable(err.to_string()),
        }
    }
}

/// Gateway over an S3-compatible backend. One instance is built at startup
/// and shared across all requests.
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl ObjectStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "cloudvault-env",
        );

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_RETRY_ATTEMPTS))
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Upload an object. A failure here means the caller must not persist
    /// metadata for this key.
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(StorageError::from_sdk)?;

        Ok(())
    }

    /// Generate a time-limited pre-signed GET URL for an object.
    pub async fn presign_download(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Rejected(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(StorageError::from_sdk)?;

        Ok(presigned.uri().to_string())
    }

    /// Delete an object. Callers treat failures as best-effort: they are
    /// logged and never abort the surrounding operation.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(StorageError::from_sdk)?;

        Ok(())
    }

    /// Canonical (non-signed) URL of an object, recorded on its metadata.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}
