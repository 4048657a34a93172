use std::collections::HashSet;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::product::{Product, ProductId};

pub const PRODUCT_ID_LENGTH: usize = 6;

pub trait IdSource: Send + Sync {
    fn candidate(&self) -> ProductId;
}

/// Short random alphanumeric tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn candidate(&self) -> ProductId {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PRODUCT_ID_LENGTH)
            .map(char::from)
            .collect();
        ProductId(token)
    }
}

/// Draws candidates until one is not held by any stored product.
pub fn assign_id(source: &dyn IdSource, existing: &[Product]) -> ProductId {
    let taken: HashSet<&str> = existing.iter().map(|product| product.id.as_str()).collect();
    loop {
        let candidate = source.candidate();
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        tracing::debug!(
            event_name = "catalog.id.collision",
            product_id = %candidate,
            "generated product id already in use, drawing again"
        );
    }
}
