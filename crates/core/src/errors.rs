use std::path::PathBuf;

use thiserror::Error;

use crate::domain::product::ProductId;

/// Field-level problems with a create or update payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Nothing to update")]
    NothingToUpdate,
    #[error("{field} must be a non-empty string")]
    BlankText { field: &'static str },
    #[error("{field} must be a number")]
    NotNumeric { field: &'static str },
    #[error("price must be a number greater than 0")]
    PriceOutOfRange,
    #[error("stock must be a non-negative integer")]
    InvalidStock,
    #[error("rating must be a number between 0 and 5")]
    RatingOutOfRange,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access catalog document `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog document `{path}`: {source}")]
    Decode { path: PathBuf, source: serde_json::Error },
    #[error("could not serialize catalog: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
    #[error("product `{0}` not found")]
    NotFound(ProductId),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
