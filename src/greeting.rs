//! Static greeting endpoints.

use axum::Json;
use serde_json::{json, Value};

/// GET / — root greeting.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

/// GET /hello — lab greeting.
pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello there! I am Sei, welcome to myjlab!" }))
}
