#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use clipvault_core::StorageConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => Ok(Arc::new(create_local_storage(config).await?)),

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Create the local filesystem backend as its concrete type, for callers
/// that verify signed URLs with [`LocalStorage::verify_signature`].
#[cfg(feature = "storage-local")]
pub async fn create_local_storage(config: &StorageConfig) -> StorageResult<LocalStorage> {
    let base_path = config.local_storage_path.clone().ok_or_else(|| {
        StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
    })?;
    let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
        StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
    })?;
    let secret = config
        .signing_secret
        .clone()
        .ok_or_else(|| StorageError::ConfigError("SIGNING_SECRET not configured".to_string()))?;

    LocalStorage::new(base_path, base_url, secret.into_bytes()).await
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    fn local_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some(path.display().to_string()),
            local_storage_base_url: Some("http://localhost:4000/assets".to_string()),
            signing_secret: Some("s".repeat(32)),
        }
    }

    #[tokio::test]
    async fn test_creates_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(&local_config(dir.path())).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_local_backend_requires_secret() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config(dir.path());
        config.signing_secret = None;
        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_s3_backend_requires_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config(dir.path());
        config.backend = StorageBackend::S3;
        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
