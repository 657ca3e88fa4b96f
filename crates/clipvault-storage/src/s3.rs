use crate::traits::{
    encode_key, validate_key, ByteStream, Storage, StorageError, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::path::Path;
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    async fn put_bytes(&self, storage_key: &str, bytes: Bytes) -> StorageResult<String> {
        validate_key(storage_key)?;
        let size = bytes.len() as u64;
        let location = ObjectPath::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.object_url(storage_key))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_file(
        &self,
        storage_key: &str,
        path: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        // Single put of the whole file; uploads are capped by the video size limit.
        let data = tokio::fs::read(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.put_bytes(storage_key, Bytes::from(data)).await
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        validate_key(storage_key)?;
        let location = ObjectPath::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bucket = self.bucket.clone();
        let key = storage_key.to_string();
        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(bucket = %bucket, key = %key, error = %e, "S3 stream download error");
                StorageError::DownloadFailed(e.to_string())
            })
        });

        Ok(Box::pin(stream))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        let location = ObjectPath::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let location = ObjectPath::from(storage_key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            expires_in_secs = expires_in.as_secs(),
            "S3 presigned URL generated"
        );

        Ok(url)
    }

    /// For AWS S3: `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    /// For S3-compatible providers, path-style under the configured endpoint.
    fn object_url(&self, storage_key: &str) -> String {
        let key = encode_key(storage_key);
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_object_url_aws() {
        let storage = S3Storage::new("videos".to_string(), "us-east-1".to_string(), None)
            .await
            .unwrap();
        assert_eq!(
            storage.object_url("wide/abc.mp4"),
            "https://videos.s3.us-east-1.amazonaws.com/wide/abc.mp4"
        );
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }

    #[tokio::test]
    async fn test_object_url_custom_endpoint() {
        let storage = S3Storage::new(
            "videos".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(
            storage.object_url("tall/abc.mp4"),
            "http://localhost:9000/videos/tall/abc.mp4"
        );
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let storage = S3Storage::new("videos".to_string(), "us-east-1".to_string(), None)
            .await
            .unwrap();
        let result = storage
            .get_presigned_url("../secret", Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
