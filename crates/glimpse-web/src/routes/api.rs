//! JSON proxy in front of the remote search backend. Validation happens
//! here so malformed requests are rejected without a backend round trip,
//! and backend error statuses pass through unchanged.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use glimpse_core::model::{SearchRequest, SearchResponse};
use glimpse_core::search::SearchBackend;

use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/search", post(search_proxy))
}

async fn search_proxy(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    request.validate()?;
    let response = state.search.search(&request).await?;
    Ok(Json(response))
}
