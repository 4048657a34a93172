use catalog_core::catalog::CatalogService;
use catalog_core::domain::product::{ProductDraft, ProductId};
use catalog_core::errors::CatalogError;
use tracing::info;

/// Deterministic demo catalog used by `seed_demo_data` and `catalog seed`.
pub fn demo_products() -> Vec<ProductDraft> {
    vec![
        ProductDraft {
            name: "ASUS ROG Strix G15".to_string(),
            category: "Laptops".to_string(),
            description: "Gaming laptop with AMD Ryzen 7, 16GB RAM, RTX 3060".to_string(),
            price: 89990.0,
            stock: 15,
            rating: 4.8,
        },
        ProductDraft {
            name: "Smartphone".to_string(),
            category: "Phones".to_string(),
            description: "6.5 inch display, 128GB storage".to_string(),
            price: 49999.0,
            stock: 30,
            rating: 4.5,
        },
        ProductDraft {
            name: "Headphones".to_string(),
            category: "Audio".to_string(),
            description: "Closed-back wired headphones".to_string(),
            price: 8999.0,
            stock: 40,
            rating: 4.1,
        },
        ProductDraft {
            name: "Wireless Mouse".to_string(),
            category: "Accessories".to_string(),
            description: "2.4GHz receiver, silent clicks".to_string(),
            price: 1500.0,
            stock: 0,
            rating: 0.0,
        },
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: Vec<ProductId>,
    pub skipped_existing: usize,
}

/// Inserts the demo catalog through the service when the catalog is empty.
pub async fn seed_if_empty(service: &CatalogService) -> Result<SeedResult, CatalogError> {
    let existing = service.list().await?.len();
    if existing > 0 {
        info!(
            event_name = "catalog.seed.skipped",
            existing_products = existing,
            "catalog already has products, demo data not loaded"
        );
        return Ok(SeedResult { inserted: Vec::new(), skipped_existing: existing });
    }

    let mut inserted = Vec::new();
    for draft in demo_products() {
        inserted.push(service.insert(draft).await?.id);
    }

    info!(
        event_name = "catalog.seed.loaded",
        inserted_products = inserted.len(),
        backend = service.backend(),
        "demo catalog loaded"
    );
    Ok(SeedResult { inserted, skipped_existing: 0 })
}
