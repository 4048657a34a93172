use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::errors::CatalogError;
use serde::Serialize;
use tracing::error;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const ROUTE_NOT_FOUND: &str = "Not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Every failed request renders as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn internal() -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: INTERNAL_ERROR.to_string() }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::InvalidInput(validation) => Self::bad_request(validation.to_string()),
            CatalogError::NotFound(_) => Self::not_found(PRODUCT_NOT_FOUND),
            CatalogError::Storage(source) => {
                error!(
                    event_name = "http.storage.error",
                    error = %source,
                    "catalog storage failure"
                );
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
