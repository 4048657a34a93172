pub mod json_file;
pub mod memory;

pub use catalog_core::catalog::ProductStore;
pub use catalog_core::errors::StoreError;
pub use json_file::JsonFileProductStore;
pub use memory::InMemoryProductStore;
