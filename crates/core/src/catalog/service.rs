use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::catalog::ids::{assign_id, IdSource, RandomIdSource};
use crate::catalog::validation::{check_draft, parse_draft, parse_patch};
use crate::catalog::ProductStore;
use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::errors::CatalogError;

/// Owns every catalog operation. Each call is a full load → mutate → save
/// cycle against the injected store; validation and lookup failures return
/// before anything is saved.
///
/// Writes through one service (and its clones) are serialized, so a request
/// always sees the effects of every write that completed before it. Separate
/// processes sharing a file store are not coordinated.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    ids: Arc<dyn IdSource>,
    writes: Arc<Mutex<()>>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self::with_id_source(store, Arc::new(RandomIdSource))
    }

    pub fn with_id_source(store: Arc<dyn ProductStore>, ids: Arc<dyn IdSource>) -> Self {
        Self { store, ids, writes: Arc::new(Mutex::new(())) }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.load().await?)
    }

    pub async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let products = self.store.load().await?;
        products
            .into_iter()
            .find(|product| &product.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    pub async fn create(&self, payload: &Value) -> Result<Product, CatalogError> {
        let draft = parse_draft(payload)?;
        self.insert(draft).await
    }

    /// Appends a draft under a freshly assigned id. The create rules are
    /// applied again, so drafts built in code get the same checks as requests.
    pub async fn insert(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let draft = check_draft(draft)?;
        let _write = self.writes.lock().await;
        let mut products = self.store.load().await?;
        let id = assign_id(self.ids.as_ref(), &products);
        let product = draft.into_product(id);

        products.push(product.clone());
        self.store.save(&products).await?;

        info!(
            event_name = "catalog.product.created",
            product_id = %product.id,
            backend = self.store.backend(),
            catalog_size = products.len(),
            "product created"
        );
        Ok(product)
    }

    pub async fn update(&self, id: &ProductId, payload: &Value) -> Result<Product, CatalogError> {
        let _write = self.writes.lock().await;
        let mut products = self.store.load().await?;
        let index = position(&products, id)?;
        let patch = parse_patch(payload)?;
        debug!(event_name = "catalog.product.patch", product_id = %id, patch = ?patch, "applying patch");

        patch.apply_to(&mut products[index]);
        self.store.save(&products).await?;

        info!(
            event_name = "catalog.product.updated",
            product_id = %id,
            backend = self.store.backend(),
            "product updated"
        );
        Ok(products.swap_remove(index))
    }

    pub async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        let _write = self.writes.lock().await;
        let mut products = self.store.load().await?;
        let index = position(&products, id)?;

        products.remove(index);
        self.store.save(&products).await?;

        info!(
            event_name = "catalog.product.deleted",
            product_id = %id,
            backend = self.store.backend(),
            catalog_size = products.len(),
            "product deleted"
        );
        Ok(())
    }
}

fn position(products: &[Product], id: &ProductId) -> Result<usize, CatalogError> {
    products
        .iter()
        .position(|product| &product.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::catalog::ids::tests::ScriptedIdSource;
    use crate::catalog::{CatalogService, ProductStore};
    use crate::domain::product::{Product, ProductDraft, ProductId};
    use crate::errors::{CatalogError, StoreError, ValidationError};

    #[derive(Default)]
    struct VecStore {
        products: Mutex<Vec<Product>>,
        saves: Mutex<usize>,
        fail_saves: AtomicBool,
    }

    impl VecStore {
        fn snapshot(&self) -> Vec<Product> {
            self.products.lock().expect("store lock").clone()
        }

        fn save_count(&self) -> usize {
            *self.saves.lock().expect("save counter lock")
        }
    }

    #[async_trait]
    impl ProductStore for VecStore {
        fn backend(&self) -> &'static str {
            "test"
        }

        async fn load(&self) -> Result<Vec<Product>, StoreError> {
            let products = self.snapshot();
            // Give other tasks a chance to run between load and save.
            tokio::task::yield_now().await;
            Ok(products)
        }

        async fn save(&self, products: &[Product]) -> Result<(), StoreError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: "catalog.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            *self.products.lock().expect("store lock") = products.to_vec();
            *self.saves.lock().expect("save counter lock") += 1;
            Ok(())
        }
    }

    fn service() -> (CatalogService, Arc<VecStore>) {
        let store = Arc::new(VecStore::default());
        (CatalogService::new(store.clone()), store)
    }

    fn mouse() -> serde_json::Value {
        json!({
            "name": "Mouse",
            "category": "Electronics",
            "description": "Wireless",
            "price": 1500,
            "stock": 10
        })
    }

    #[tokio::test]
    async fn create_then_get_returns_the_same_record() {
        let (service, _) = service();

        let created = service.create(&mouse()).await.expect("create");
        let fetched = service.get(&created.id).await.expect("get");

        assert_eq!(created, fetched);
        assert_eq!(created.rating, 0.0);
        assert_eq!(created.id.as_str().len(), 6);
    }

    #[tokio::test]
    async fn created_ids_are_unique_even_when_the_source_repeats() {
        let store = Arc::new(VecStore::default());
        let ids = Arc::new(ScriptedIdSource::new(vec!["dup001", "dup001", "dup001", "new002"]));
        let service = CatalogService::with_id_source(store, ids);

        let first = service.create(&mouse()).await.expect("first");
        let second = service.create(&mouse()).await.expect("second");

        assert_eq!(first.id, ProductId("dup001".to_string()));
        assert_eq!(second.id, ProductId("new002".to_string()));
    }

    #[tokio::test]
    async fn many_creates_never_reuse_an_id() {
        let (service, _) = service();
        for _ in 0..50 {
            service.create(&mouse()).await.expect("create");
        }

        let products = service.list().await.expect("list");
        let ids: HashSet<_> = products.iter().map(|product| product.id.clone()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let (service, _) = service();
        let mut expected = Vec::new();
        for name in ["Mouse", "Keyboard", "Monitor"] {
            let mut payload = mouse();
            payload["name"] = json!(name);
            expected.push(service.create(&payload).await.expect("create").id);
        }

        let listed: Vec<_> =
            service.list().await.expect("list").into_iter().map(|product| product.id).collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn invalid_create_does_not_touch_the_store() {
        let (service, store) = service();
        let mut payload = mouse();
        payload["price"] = json!(-5);

        let error = service.create(&payload).await.expect_err("invalid price");

        assert!(matches!(error, CatalogError::InvalidInput(ValidationError::PriceOutOfRange)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let (service, _) = service();
        let created = service.create(&mouse()).await.expect("create");

        let updated = service
            .update(&created.id, &json!({ "stock": 5, "name": "  Trackball " }))
            .await
            .expect("update");

        assert_eq!(updated.stock, 5);
        assert_eq!(updated.name, "Trackball");
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.price, created.price);
        assert_eq!(service.get(&created.id).await.expect("get"), updated);
    }

    #[tokio::test]
    async fn update_can_set_stock_and_rating_to_zero() {
        let (service, _) = service();
        let mut payload = mouse();
        payload["rating"] = json!(4.5);
        let created = service.create(&payload).await.expect("create");

        let updated = service
            .update(&created.id, &json!({ "stock": 0, "rating": 0 }))
            .await
            .expect("update");

        assert_eq!(updated.stock, 0);
        assert_eq!(updated.rating, 0.0);
    }

    #[tokio::test]
    async fn empty_update_is_rejected_and_leaves_record_unchanged() {
        let (service, store) = service();
        let created = service.create(&mouse()).await.expect("create");
        let saves_before = store.save_count();

        let error = service.update(&created.id, &json!({})).await.expect_err("empty patch");

        assert!(matches!(error, CatalogError::InvalidInput(ValidationError::NothingToUpdate)));
        assert_eq!(store.save_count(), saves_before);
        assert_eq!(service.get(&created.id).await.expect("get"), created);
    }

    #[tokio::test]
    async fn partially_invalid_update_applies_nothing() {
        let (service, _) = service();
        let created = service.create(&mouse()).await.expect("create");

        let error = service
            .update(&created.id, &json!({ "name": "Renamed", "rating": 9 }))
            .await
            .expect_err("bad rating");

        assert!(error.is_invalid_input());
        assert_eq!(service.get(&created.id).await.expect("get").name, "Mouse");
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found_before_payload_checks() {
        let (service, _) = service();

        let error =
            service.update(&ProductId::from("nope00"), &json!({})).await.expect_err("missing");

        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (service, _) = service();
        let created = service.create(&mouse()).await.expect("create");

        service.delete(&created.id).await.expect("delete");

        assert!(service.get(&created.id).await.expect_err("deleted").is_not_found());
        assert!(service.delete(&created.id).await.expect_err("deleted twice").is_not_found());
    }

    #[tokio::test]
    async fn failed_save_surfaces_as_storage_error() {
        let (service, store) = service();
        let created = service.create(&mouse()).await.expect("create");
        store.fail_saves.store(true, Ordering::SeqCst);

        let error = service.delete(&created.id).await.expect_err("save fails");

        assert!(matches!(error, CatalogError::Storage(_)));
        assert_eq!(store.snapshot(), vec![created]);
    }

    #[tokio::test]
    async fn insert_rejects_drafts_that_break_the_create_rules() {
        let (service, store) = service();
        let draft = ProductDraft {
            name: "  ".to_string(),
            category: String::new(),
            description: "Broken".to_string(),
            price: -5.0,
            stock: 1,
            rating: 9.0,
        };

        let error = service.insert(draft).await.expect_err("invalid draft");

        assert!(error.is_invalid_input());
        assert_eq!(store.save_count(), 0);
        assert!(service.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn insert_trims_text_from_code_built_drafts() {
        let (service, _) = service();
        let draft = ProductDraft {
            name: " Monitor ".to_string(),
            category: "Displays".to_string(),
            description: "27 inch".to_string(),
            price: 300.0,
            stock: 2,
            rating: 0.0,
        };

        assert_eq!(service.insert(draft).await.expect("insert").name, "Monitor");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_writes_are_all_kept() {
        let (service, _) = service();
        let target = service.create(&mouse()).await.expect("target");

        let mut creates = Vec::new();
        for index in 0..100 {
            let service = service.clone();
            creates.push(tokio::spawn(async move {
                let mut payload = mouse();
                payload["name"] = json!(format!("Item {index}"));
                service.create(&payload).await
            }));
        }
        let mut updates = Vec::new();
        for stock in 1..=20u32 {
            let service = service.clone();
            let id = target.id.clone();
            updates.push(tokio::spawn(async move {
                service.update(&id, &json!({ "stock": stock })).await
            }));
        }
        let rename = {
            let service = service.clone();
            let id = target.id.clone();
            tokio::spawn(async move { service.update(&id, &json!({ "name": "Renamed" })).await })
        };

        for task in creates {
            task.await.expect("create task").expect("create");
        }
        for task in updates {
            task.await.expect("update task").expect("update");
        }
        rename.await.expect("rename task").expect("rename");

        let products = service.list().await.expect("list");
        assert_eq!(products.len(), 101);
        let names: HashSet<_> = products.iter().map(|product| product.name.clone()).collect();
        for index in 0..100 {
            assert!(names.contains(&format!("Item {index}")), "Item {index} was lost");
        }
        let updated = service.get(&target.id).await.expect("target survives");
        assert_eq!(updated.name, "Renamed");
        assert!((1..=20).contains(&updated.stock));
        assert_eq!(updated.price, target.price);
    }
}
