use catalog_core::catalog::CatalogService;
use catalog_core::config::{AppConfig, ConfigError};
use catalog_core::errors::{CatalogError, StoreError};
use catalog_db::{open_store, seed_if_empty};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub catalog: CatalogService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("product store could not be opened: {0}")]
    Storage(#[source] StoreError),
    #[error("demo data could not be loaded: {0}")]
    Seed(#[source] CatalogError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        storage_backend = config.storage.backend.as_str(),
        "starting application bootstrap"
    );

    let store = open_store(&config.storage).await.map_err(BootstrapError::Storage)?;
    let catalog = CatalogService::new(store);
    info!(
        event_name = "system.bootstrap.store_opened",
        storage_backend = catalog.backend(),
        storage_path = %config.storage.path.display(),
        "product store opened"
    );

    if config.storage.seed_demo_data {
        let seeded = seed_if_empty(&catalog).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.demo_data",
            inserted = seeded.inserted.len(),
            skipped_existing = seeded.skipped_existing,
            "demo data check complete"
        );
    }

    Ok(Application { config, catalog })
}
