//! Static page and health check.

use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub async fn page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": stylize_core::VERSION,
    }))
}
