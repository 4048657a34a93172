use tokio::sync::RwLock;

use catalog_core::domain::product::Product;

use super::{ProductStore, StoreError};

/// Volatile catalog held in process memory; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    #[cfg(test)]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.clone())
    }

    async fn save(&self, products: &[Product]) -> Result<(), StoreError> {
        let mut stored = self.products.write().await;
        *stored = products.to_vec();
        Ok(())
    }
}
