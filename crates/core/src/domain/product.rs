use std::fmt;

use serde::{Deserialize, Serialize};

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A stored catalog record. Every required field is always populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    #[serde(default)]
    pub rating: f64,
}

/// Validated input for a new product; the id is assigned on insert.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub rating: f64,
}

impl ProductDraft {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            stock: self.stock,
            rating: self.rating,
        }
    }
}

/// Validated partial update. `None` means the field was not in the payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub rating: Option<f64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.rating.is_none()
    }

    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
    }
}
