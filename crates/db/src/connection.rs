use std::sync::Arc;

use catalog_core::catalog::ProductStore;
use catalog_core::config::{StorageBackend, StorageConfig};
use catalog_core::errors::StoreError;

use crate::repositories::{InMemoryProductStore, JsonFileProductStore};

/// Builds the store selected by `[storage]`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ProductStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryProductStore::default())),
        StorageBackend::JsonFile => Ok(Arc::new(JsonFileProductStore::open(&config.path).await?)),
    }
}
