//! Client for the upload relay: trades a local video file for a
//! dereferenceable URL the search backend can fetch.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::encode::is_video_type;
use crate::error::{GlimpseError, Result};
use crate::model::Query;

#[derive(Deserialize)]
struct RelayResponse {
    url: String,
}

pub struct UploadClient {
    client: Client,
    base_url: url::Url,
    embedding_model: String,
}

impl UploadClient {
    pub fn new(base_url: &str, embedding_model: impl Into<String>) -> Result<Self> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| GlimpseError::Config(format!("invalid relay URL: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            embedding_model: embedding_model.into(),
        })
    }

    /// Upload a video and turn the relay's answer into a `url` query.
    /// Non-video files are rejected before any network call. Relay failures
    /// surface as [`GlimpseError::Upload`] with no retry.
    pub async fn upload_video(
        &self,
        name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Query> {
        if !is_video_type(media_type) {
            return Err(GlimpseError::Validation(format!(
                "'{name}' is not a video file ({media_type})"
            )));
        }

        let part = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(media_type)
            .map_err(|e| GlimpseError::Validation(format!("invalid media type: {e}")))?;
        let form = Form::new().part("file", part);

        let endpoint = self
            .base_url
            .join("api/upload")
            .map_err(|e| GlimpseError::Config(format!("invalid relay URL: {e}")))?;

        let response = self.client.post(endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| format!("relay returned status {status}"));
            return Err(GlimpseError::Upload(message));
        }

        let body: RelayResponse = response
            .json()
            .await
            .map_err(|e| GlimpseError::Upload(format!("malformed relay response: {e}")))?;

        let absolute = resolve_relay_url(&self.base_url, &body.url)?;
        Ok(Query::url(absolute, &self.embedding_model))
    }
}

/// The relay answers with a path like `/uploads/169...-clip.mp4`. Resolve it
/// against the relay's base so the query carries an absolute URL the backend
/// can actually fetch.
fn resolve_relay_url(base: &url::Url, raw: &str) -> Result<String> {
    let resolved = url::Url::parse(raw)
        .or_else(|_| base.join(raw))
        .map_err(|e| GlimpseError::Upload(format!("relay returned an unusable URL: {e}")))?;
    Ok(resolved.to_string())
}
