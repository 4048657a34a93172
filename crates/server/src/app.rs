use std::any::Any;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use catalog_core::catalog::CatalogService;
use catalog_core::config::ServerConfig;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
};
use tracing::{error, warn};

use crate::error::{ApiError, ROUTE_NOT_FOUND};
use crate::{docs, health, products, request_log};

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
}

pub fn router(catalog: CatalogService, server: &ServerConfig) -> Router {
    let routes = Router::new()
        .nest("/api", products::router())
        .merge(health::router())
        .merge(docs::router())
        .fallback(not_found)
        .with_state(AppState { catalog });

    with_layers(routes, server)
}

/// Outermost first: request logging, panic → 500, CORS.
pub fn with_layers(routes: Router, server: &ServerConfig) -> Router {
    routes
        .layer(cors_layer(&server.cors_allowed_origins))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(request_log::log_requests))
}

async fn not_found() -> ApiError {
    ApiError::not_found(ROUTE_NOT_FOUND)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(
                        event_name = "system.cors.invalid_origin",
                        origin = %origin,
                        "ignoring CORS origin that is not a valid header value"
                    );
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!(event_name = "http.handler.panic", detail = %detail, "request handler panicked");
    ApiError::internal().into_response()
}
