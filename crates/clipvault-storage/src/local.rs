use crate::traits::{
    encode_key, validate_key, ByteStream, Storage, StorageError, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Signed URLs have the form `{base_url}/{key}?expires={unix}&signature={hex}`
/// where the signature is HMAC-SHA256 over `{key}:{expires}`. The API serves
/// them after checking [`LocalStorage::verify_signature`].
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signing_secret: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/clipvault/assets")
    /// * `base_url` - Base URL the API serves files from (e.g., "http://localhost:4000/assets")
    /// * `signing_secret` - HMAC key for signed URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signing_secret: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let signing_secret = signing_secret.into();

        if signing_secret.is_empty() {
            return Err(StorageError::ConfigError(
                "Signing secret must not be empty".to_string(),
            ));
        }

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            signing_secret,
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        // Existing files may be symlinks; make sure they still resolve inside the root.
        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.signing_secret).expect("HMAC accepts any key size")
    }

    fn signature(&self, storage_key: &str, expires: u64) -> String {
        let mut mac = self.mac();
        mac.update(storage_key.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a signed URL's `expires` and `signature` query values for `storage_key`.
    pub fn verify_signature(
        &self,
        storage_key: &str,
        expires: u64,
        signature: &str,
    ) -> StorageResult<()> {
        validate_key(storage_key)?;

        let provided = hex::decode(signature)
            .map_err(|_| StorageError::AccessDenied("Malformed signature".to_string()))?;

        let mut mac = self.mac();
        mac.update(storage_key.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| StorageError::AccessDenied("Invalid signature".to_string()))?;

        if unix_now() > expires {
            return Err(StorageError::AccessDenied(
                "Signed URL has expired".to_string(),
            ));
        }

        Ok(())
    }

}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_file(
        &self,
        storage_key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(source, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.object_url(storage_key))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let key = storage_key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream download error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let expires = unix_now() + expires_in.as_secs();
        let signature = self.signature(storage_key, expires);
        Ok(format!(
            "{}?expires={}&signature={}",
            self.object_url(storage_key),
            expires,
            signature
        ))
    }

    fn object_url(&self, storage_key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_key(storage_key)
        )
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SECRET: &str = "local-signing-secret-for-tests-0123456789";

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:4000/assets".to_string(), SECRET)
            .await
            .unwrap()
    }

    fn query_value<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap()
    }

    async fn read_all(storage: &LocalStorage, key: &str) -> StorageResult<Vec<u8>> {
        let mut stream = storage.download_stream(key).await?;
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }

    #[tokio::test]
    async fn test_put_file_and_download() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir.path().join("store")).await;

        let source = dir.path().join("upload.mp4");
        tokio::fs::write(&source, b"fake mp4").await.unwrap();

        let url = storage
            .put_file("wide/abc.mp4", &source, "video/mp4")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:4000/assets/wide/abc.mp4");

        assert_eq!(read_all(&storage, "wide/abc.mp4").await.unwrap(), b"fake mp4");
        // The source is left for its owner to remove.
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = read_all(&storage, "../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let source = dir.path().join("upload.mp4");
        tokio::fs::write(&source, b"x").await.unwrap();
        let result = storage.put_file("../escape.mp4", &source, "video/mp4").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let result = read_all(&storage, "wide/missing.mp4").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let source = dir.path().join("x.mp4");
        tokio::fs::write(&source, b"x").await.unwrap();
        storage
            .put_file("tall/x.mp4", &source, "video/mp4")
            .await
            .unwrap();

        assert!(storage.exists("tall/x.mp4").await.unwrap());
        assert!(!storage.exists("tall/y.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_presigned_url_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .get_presigned_url("wide/abc.mp4", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:4000/assets/wide/abc.mp4?expires="));

        let expires: u64 = query_value(&url, "expires").parse().unwrap();
        let signature = query_value(&url, "signature");
        let now = unix_now();
        assert!(expires >= now + 59 && expires <= now + 61);

        assert!(storage
            .verify_signature("wide/abc.mp4", expires, signature)
            .is_ok());
        // A signature is bound to its key and expiry.
        assert!(matches!(
            storage.verify_signature("wide/other.mp4", expires, signature),
            Err(StorageError::AccessDenied(_))
        ));
        assert!(matches!(
            storage.verify_signature("wide/abc.mp4", expires + 1, signature),
            Err(StorageError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_signature_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let expires = unix_now() - 10;
        let signature = storage.signature("wide/abc.mp4", expires);
        let result = storage.verify_signature("wide/abc.mp4", expires, &signature);
        assert!(matches!(result, Err(StorageError::AccessDenied(msg)) if msg.contains("expired")));
    }

    #[tokio::test]
    async fn test_empty_secret_rejected() {
        let dir = tempdir().unwrap();
        let result =
            LocalStorage::new(dir.path(), "http://localhost/assets".to_string(), Vec::new()).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
