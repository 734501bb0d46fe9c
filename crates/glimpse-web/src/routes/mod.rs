pub mod api;
pub mod page;
pub mod upload;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use glimpse_core::config::GlimpseConfig;
use tower_http::services::ServeDir;

use crate::AppState;

pub fn router(config: &GlimpseConfig) -> Router<Arc<AppState>> {
    // Leave headroom for multipart framing on top of the file itself.
    let body_limit = config.upload.max_bytes as usize + 64 * 1024;

    Router::new()
        .route("/health", get(health))
        .merge(page::routes())
        .merge(api::routes())
        .merge(upload::routes())
        .nest_service("/uploads", ServeDir::new(&config.upload.dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .fallback(not_found)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "backend": state.search.base_url(),
    }))
}

async fn not_found() -> (axum::http::StatusCode, Html<String>) {
    let body = r#"<!doctype html>
<html><head><title>404 — Glimpse</title>
<style>body{font-family:system-ui;background:#101418;color:#e0e0e0;display:flex;justify-content:center;align-items:center;height:100vh;margin:0}
.box{text-align:center}
h1{font-size:4rem;color:#4da3ff;margin:0}
p{color:#888;margin:0.5rem 0 1.5rem}
a{color:#4da3ff;text-decoration:none;padding:0.5rem 1rem;border:1px solid #2a3542;border-radius:8px}
a:hover{border-color:#4da3ff;background:rgba(77,163,255,0.1)}</style>
</head><body><div class="box"><h1>404</h1><p>This page doesn't exist.</p><a href="/">Back to search</a></div></body></html>"#;
    (axum::http::StatusCode::NOT_FOUND, Html(body.to_string()))
}
