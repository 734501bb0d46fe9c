//! The upload relay: accepts one multipart file, writes it into the upload
//! directory, and answers with the `/uploads/...` URL it will be served
//! from. Only media files are accepted, and never above the configured size.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::Json;
use axum::routing::post;
use axum::Router;

use crate::error::ApiError;
use crate::store;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/upload", post(upload))
}

/// Media type of the part: the declared content type when the client sent a
/// useful one, otherwise sniffed from the bytes.
fn effective_media_type(declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    match declared {
        Some(t) if !t.is_empty() && t != "application/octet-stream" => Some(t.to_string()),
        _ => infer::get(bytes).map(|kind| kind.mime_type().to_string()),
    }
}

fn is_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/") || media_type.starts_with("video/")
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read file: {e}")))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("uploaded file is empty"));
        }
        if bytes.len() as u64 > state.config.upload.max_bytes {
            return Err(ApiError::payload_too_large(format!(
                "file exceeds the {} byte upload limit",
                state.config.upload.max_bytes
            )));
        }

        let media_type = effective_media_type(declared.as_deref(), &bytes)
            .filter(|t| is_media_type(t))
            .ok_or_else(|| {
                ApiError::bad_request(format!("'{original_name}' is not an image or video file"))
            })?;

        let url = store::save_upload(&state.config.upload.dir, &original_name, &bytes)
            .await
            .map_err(|e| ApiError::internal(format!("failed to store upload: {e}")))?;

        tracing::info!(name = %original_name, %media_type, size = bytes.len(), %url, "stored upload");
        return Ok(Json(serde_json::json!({ "url": url })));
    }

    Err(ApiError::bad_request("no file uploaded"))
}
