pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::{CatalogService, IdSource, ProductStore, RandomIdSource};
pub use domain::product::{Product, ProductDraft, ProductId, ProductPatch};
pub use errors::{CatalogError, StoreError, ValidationError};
