use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use catalog_core::catalog::CatalogService;
use chrono::Utc;
use serde::Serialize;

use crate::app::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub storage: HealthCheck,
    pub checked_at: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = storage_check(&state.catalog).await;
    let ready = storage.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "catalog-server runtime initialized".to_string(),
        },
        storage,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn storage_check(catalog: &CatalogService) -> HealthCheck {
    match catalog.list().await {
        Ok(products) => HealthCheck {
            status: "ready",
            detail: format!("{} backend loaded {} products", catalog.backend(), products.len()),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("{} backend failed to load: {error}", catalog.backend()),
        },
    }
}
