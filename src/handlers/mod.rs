pub mod admin;
pub mod compensation;
pub mod orders;
pub mod partners;

use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
