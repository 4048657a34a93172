//! Durable-by-rewrite catalog store.
//!
//! Every `load` reads and parses the whole document; every `save` serializes
//! the whole sequence into a sibling temporary file and renames it over the
//! document, so readers see either the old or the new catalog and never a
//! half-written one. On Unix the parent directory is fsynced after the rename
//! so the new directory entry survives a crash. Nothing serializes concurrent load/save cycles, so
//! overlapping writers are last-write-wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use catalog_core::domain::product::Product;
use tracing::{debug, info};

use super::{ProductStore, StoreError};

const EMPTY_DOCUMENT: &[u8] = b"[]\n";

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct JsonFileProductStore {
    path: PathBuf,
}

impl JsonFileProductStore {
    /// Opens the document at `path`, creating parent directories and an empty
    /// catalog when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|source| io_error(parent, source))?;
        }

        let exists = tokio::fs::try_exists(&path).await.map_err(|source| io_error(&path, source))?;
        if !exists {
            tokio::fs::write(&path, EMPTY_DOCUMENT)
                .await
                .map_err(|source| io_error(&path, source))?;
            info!(
                event_name = "catalog.store.initialized",
                path = %path.display(),
                "created empty catalog document"
            );
        }

        Ok(Self { path })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.path.with_file_name(format!(".{file_name}.{}.{sequence}.tmp", std::process::id()))
    }
}

#[async_trait::async_trait]
impl ProductStore for JsonFileProductStore {
    fn backend(&self) -> &'static str {
        "json_file"
    }

    async fn load(&self) -> Result<Vec<Product>, StoreError> {
        let raw = tokio::fs::read(&self.path).await.map_err(|source| io_error(&self.path, source))?;
        serde_json::from_slice(&raw)
            .map_err(|source| StoreError::Decode { path: self.path.clone(), source })
    }

    async fn save(&self, products: &[Product]) -> Result<(), StoreError> {
        let mut document = serde_json::to_vec_pretty(products).map_err(StoreError::Encode)?;
        document.push(b'\n');

        let temp = self.temp_path();
        if let Err(error) = write_synced(&temp, &document).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(error);
        }
        tokio::fs::rename(&temp, &self.path).await.map_err(|source| io_error(&self.path, source))?;
        sync_parent_dir(&self.path).await?;

        debug!(
            event_name = "catalog.store.saved",
            path = %self.path.display(),
            products = products.len(),
            bytes = document.len(),
            "catalog document rewritten"
        );
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    tokio::fs::write(path, bytes).await.map_err(|source| io_error(path, source))?;
    let file = tokio::fs::File::open(path).await.map_err(|source| io_error(path, source))?;
    file.sync_all().await.map_err(|source| io_error(path, source))
}

#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> Result<(), StoreError> {
    let parent =
        path.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let dir = tokio::fs::File::open(parent).await.map_err(|source| io_error(parent, source))?;
    dir.sync_all().await.map_err(|source| io_error(parent, source))
}

// Directory handles cannot be opened for fsync here.
#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io { path: path.to_path_buf(), source }
}
