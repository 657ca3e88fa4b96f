//! Storage setup and initialization

use anyhow::{Context, Result};
use clipvault_core::{Config, StorageBackend};
use clipvault_storage::{create_local_storage, create_storage, LocalStorage, Storage};
use std::sync::Arc;

/// Build the configured storage backend.
///
/// With the local backend the same instance is also returned concretely so
/// `/assets` can verify the URLs it signs.
pub async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn Storage>, Option<Arc<LocalStorage>>)> {
    tracing::info!("Initializing storage abstraction...");

    let (storage, local_assets): (Arc<dyn Storage>, Option<Arc<LocalStorage>>) =
        match config.storage.backend {
            StorageBackend::Local => {
                let local = Arc::new(
                    create_local_storage(&config.storage)
                        .await
                        .context("Failed to initialize local storage")?,
                );
                let storage: Arc<dyn Storage> = local.clone();
                (storage, Some(local))
            }
            StorageBackend::S3 => (
                create_storage(&config.storage)
                    .await
                    .context("Failed to initialize S3 storage")?,
                None,
            ),
        };

    tracing::info!(
        backend = ?storage.backend_type(),
        "Storage abstraction initialized successfully"
    );

    Ok((storage, local_assets))
}
