//! Machine-readable description of the product API at `/api-docs/openapi.json`.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi))
}

async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

pub fn openapi_document() -> Value {
    let id_parameter = json!({
        "in": "path",
        "name": "id",
        "required": true,
        "schema": { "type": "string" },
        "description": "Product id"
    });
    let product_ref = json!({ "$ref": "#/components/schemas/Product" });
    let error_ref = json!({ "$ref": "#/components/schemas/Error" });
    let json_content = |schema: Value| json!({ "application/json": { "schema": schema } });
    let error_response =
        |description: &str| json!({ "description": description, "content": json_content(error_ref.clone()) });
    let patch_body = json!({
        "required": true,
        "content": json_content(json!({ "$ref": "#/components/schemas/ProductPatch" }))
    });

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Product catalog API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "CRUD over the product catalog"
        },
        "servers": [{ "url": "/api" }],
        "paths": {
            "/products": {
                "get": {
                    "summary": "List every product in stored order",
                    "tags": ["Products"],
                    "responses": {
                        "200": {
                            "description": "Product list",
                            "content": json_content(json!({ "type": "array", "items": product_ref }))
                        }
                    }
                },
                "post": {
                    "summary": "Create a product",
                    "tags": ["Products"],
                    "requestBody": {
                        "required": true,
                        "content": json_content(json!({ "$ref": "#/components/schemas/ProductInput" }))
                    },
                    "responses": {
                        "201": { "description": "Created product", "content": json_content(product_ref.clone()) },
                        "400": error_response("Missing or invalid fields")
                    }
                }
            },
            "/products/{id}": {
                "parameters": [id_parameter],
                "get": {
                    "summary": "Fetch a product by id",
                    "tags": ["Products"],
                    "responses": {
                        "200": { "description": "Product", "content": json_content(product_ref.clone()) },
                        "404": error_response("Product not found")
                    }
                },
                "patch": {
                    "summary": "Update some fields of a product",
                    "tags": ["Products"],
                    "requestBody": patch_body.clone(),
                    "responses": {
                        "200": { "description": "Updated product", "content": json_content(product_ref.clone()) },
                        "400": error_response("Nothing to update or invalid fields"),
                        "404": error_response("Product not found")
                    }
                },
                "put": {
                    "summary": "Update some fields of a product",
                    "tags": ["Products"],
                    "requestBody": patch_body,
                    "responses": {
                        "200": { "description": "Updated product", "content": json_content(product_ref) },
                        "400": error_response("Nothing to update or invalid fields"),
                        "404": error_response("Product not found")
                    }
                },
                "delete": {
                    "summary": "Delete a product",
                    "tags": ["Products"],
                    "responses": {
                        "204": { "description": "Product deleted, no body" },
                        "404": error_response("Product not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Product": {
                    "type": "object",
                    "required": ["id", "name", "category", "description", "price", "stock", "rating"],
                    "properties": product_properties(true)
                },
                "ProductInput": {
                    "type": "object",
                    "required": ["name", "category", "description", "price", "stock"],
                    "properties": product_properties(false)
                },
                "ProductPatch": {
                    "type": "object",
                    "minProperties": 1,
                    "properties": product_properties(false)
                },
                "Error": {
                    "type": "object",
                    "required": ["error"],
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

fn product_properties(with_id: bool) -> Value {
    let mut properties = json!({
        "name": { "type": "string", "example": "ASUS ROG Strix G15" },
        "category": { "type": "string", "example": "Laptops" },
        "description": { "type": "string", "example": "Gaming laptop with AMD Ryzen 7" },
        "price": { "type": "number", "exclusiveMinimum": true, "minimum": 0, "example": 89990 },
        "stock": { "type": "integer", "minimum": 0, "example": 15 },
        "rating": { "type": "number", "minimum": 0, "maximum": 5, "default": 0, "example": 4.8 }
    });
    if with_id {
        properties["id"] = json!({ "type": "string", "description": "Assigned by the service", "example": "a1B2c3" });
    }
    properties
}
