//! Product resource routes, mounted under `/api`.
//!
//! - `GET    /products`        full catalog in stored order
//! - `GET    /products/{id}`   one product
//! - `POST   /products`        create, 201 with the stored record
//! - `PUT    /products/{id}`   partial update (same as PATCH)
//! - `PATCH  /products/{id}`   partial update
//! - `DELETE /products/{id}`   remove, 204 with no body

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_core::domain::product::{Product, ProductId};
use serde_json::Value;
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/products", get(list_products).post(create_product)).route(
        "/products/{id}",
        get(get_product).put(update_product).patch(update_product).delete(delete_product),
    )
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

async fn get_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get(&ProductId(id)).await?))
}

async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(payload) = payload?;
    debug!(event_name = "http.products.create", body = %payload, "create product request");

    let product = state.catalog.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = ProductId(id);
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            // An unknown id is still reported as 404 ahead of a bad body.
            state.catalog.get(&id).await?;
            return Err(rejection.into());
        }
    };
    debug!(event_name = "http.products.update", product_id = %id, body = %payload, "update product request");

    Ok(Json(state.catalog.update(&id, &payload).await?))
}

async fn delete_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&ProductId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use catalog_core::catalog::CatalogService;
    use catalog_core::config::ServerConfig;
    use catalog_db::{InMemoryProductStore, JsonFileProductStore};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::app::router;

    fn server_config() -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            cors_allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }

    fn app() -> Router {
        router(CatalogService::new(Arc::new(InMemoryProductStore::default())), &server_config())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    fn mouse() -> Value {
        json!({
            "name": "Mouse",
            "category": "Electronics",
            "description": "Wireless",
            "price": 1500,
            "stock": 10
        })
    }

    #[tokio::test]
    async fn end_to_end_product_lifecycle() {
        let app = app();

        let (status, created) = send(&app, Method::POST, "/api/products", Some(mouse())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().expect("generated id").to_string();
        assert_eq!(created["rating"].as_f64(), Some(0.0));
        assert_eq!(created["name"], "Mouse");

        let uri = format!("/api/products/{id}");
        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, patched) = send(&app, Method::PATCH, &uri, Some(json!({ "stock": 5 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["stock"], 5);
        assert_eq!(patched["name"], created["name"]);
        assert_eq!(patched["category"], created["category"]);
        assert_eq!(patched["description"], created["description"]);
        assert_eq!(patched["price"], created["price"]);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Product not found" }));
    }

    #[tokio::test]
    async fn list_returns_products_in_creation_order() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        for name in ["Laptop", "Phone"] {
            let mut payload = mouse();
            payload["name"] = json!(name);
            send(&app, Method::POST, "/api/products", Some(payload)).await;
        }

        let (_, body) = send(&app, Method::GET, "/api/products", None).await;
        let names: Vec<_> = body
            .as_array()
            .expect("array")
            .iter()
            .map(|product| product["name"].as_str().expect("name").to_string())
            .collect();
        assert_eq!(names, vec!["Laptop".to_string(), "Phone".to_string()]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payloads_with_400() {
        let app = app();

        let mut negative = mouse();
        negative["price"] = json!(-5);
        let (status, body) = send(&app, Method::POST, "/api/products", Some(negative)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "price must be a number greater than 0");

        let mut high_rating = mouse();
        high_rating["rating"] = json!(7);
        let (status, _) = send(&app, Method::POST, "/api/products", Some(high_rating)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, Method::POST, "/api/products", Some(json!({ "name": "Mouse" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: category, description, price, stock");

        let (_, listed) = send(&app, Method::GET, "/api/products", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn create_accepts_zero_stock() {
        let app = app();
        let mut payload = mouse();
        payload["price"] = json!(100);
        payload["stock"] = json!(0);

        let (status, body) = send(&app, Method::POST, "/api/products", Some(payload)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["stock"], 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_400_with_error_body() {
        let app = app();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/products")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{ not json"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert!(body["error"].as_str().expect("error").starts_with("invalid JSON body"));
    }

    #[tokio::test]
    async fn update_edge_cases() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/products", Some(mouse())).await;
        let uri = format!("/api/products/{}", created["id"].as_str().expect("id"));

        let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Nothing to update" }));

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "price": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(json!({ "rating": "4.5", "name": " Trackball " })))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rating"].as_f64(), Some(4.5));
        assert_eq!(body["name"], "Trackball");

        let (status, body) =
            send(&app, Method::PATCH, "/api/products/zzzzzz", Some(json!({ "stock": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");

        let (status, _) = send(&app, Method::PATCH, "/api/products/zzzzzz", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_of_unknown_product_is_404() {
        let app = app();
        let (status, body) = send(&app, Method::DELETE, "/api/products/zzzzzz", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn file_backed_catalog_is_served_after_restart() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("products.json");

        let first = router(
            CatalogService::new(Arc::new(JsonFileProductStore::open(&path).await.expect("open"))),
            &server_config(),
        );
        let (status, created) = send(&first, Method::POST, "/api/products", Some(mouse())).await;
        assert_eq!(status, StatusCode::CREATED);

        let second = router(
            CatalogService::new(Arc::new(JsonFileProductStore::open(&path).await.expect("reopen"))),
            &server_config(),
        );
        let (status, listed) = send(&second, Method::GET, "/api/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn unreadable_store_is_a_generic_500() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("products.json");
        let store = JsonFileProductStore::open(&path).await.expect("open");
        std::fs::write(&path, "not a catalog").expect("corrupt document");
        let app = router(CatalogService::new(Arc::new(store)), &server_config());

        let (status, body) = send(&app, Method::GET, "/api/products", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn overlapping_requests_keep_every_write() {
        let app = app();
        let (_, target) = send(&app, Method::POST, "/api/products", Some(mouse())).await;
        let uri = format!("/api/products/{}", target["id"].as_str().expect("id"));

        let mut tasks = Vec::new();
        for index in 0..50 {
            let app = app.clone();
            tasks.push(tokio::spawn(async move {
                let mut payload = mouse();
                payload["name"] = json!(format!("Mouse {index}"));
                send(&app, Method::POST, "/api/products", Some(payload)).await.0
            }));
        }
        let patches = [json!({ "stock": 0 }), json!({ "rating": 4.5 }), json!({ "category": "Input" })];
        for patch in patches {
            let app = app.clone();
            let uri = uri.clone();
            tasks.push(tokio::spawn(async move {
                send(&app, Method::PATCH, &uri, Some(patch)).await.0
            }));
        }

        for task in tasks {
            let status = task.await.expect("request task");
            assert!(status == StatusCode::CREATED || status == StatusCode::OK, "got {status}");
        }

        let (_, listed) = send(&app, Method::GET, "/api/products", None).await;
        assert_eq!(listed.as_array().expect("array").len(), 51);
        let (_, updated) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(updated["stock"], 0);
        assert_eq!(updated["rating"].as_f64(), Some(4.5));
        assert_eq!(updated["category"], "Input");
        assert_eq!(updated["name"], "Mouse");
    }
}
