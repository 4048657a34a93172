pub mod ids;
pub mod service;
pub mod validation;

use async_trait::async_trait;

use crate::domain::product::Product;
use crate::errors::StoreError;

pub use ids::{IdSource, RandomIdSource};
pub use service::CatalogService;

/// Load-all / save-all persistence for the catalog sequence.
///
/// Implementations hand back the whole catalog in stored order and replace it
/// wholly on save. There is no locking across a load/save pair: two writers
/// interleaving their cycles will lose whichever change is saved first.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Short backend name used in logs and health output.
    fn backend(&self) -> &'static str;

    async fn load(&self) -> Result<Vec<Product>, StoreError>;

    async fn save(&self, products: &[Product]) -> Result<(), StoreError>;
}
