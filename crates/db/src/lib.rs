pub mod connection;
pub mod fixtures;
pub mod repositories;

pub use connection::open_store;
pub use fixtures::{demo_products, seed_if_empty, SeedResult};
pub use repositories::{InMemoryProductStore, JsonFileProductStore};
