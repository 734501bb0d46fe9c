//! HTTP client for the remote multimodal search backend.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{GlimpseError, Result};
use crate::model::{SearchRequest, SearchResponse};

/// Abstract search backend. [`SearchClient`] is the real implementation;
/// the session tests substitute a scripted mock.
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl std::future::Future<Output = Result<SearchResponse>> + Send;
}

/// Error body shapes the backend is known to produce.
#[derive(Deserialize)]
struct BackendErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Client for the backend's `POST /search` endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SearchBackend for SearchClient {
    /// Send a search request. Queries are validated first; an invalid
    /// request never reaches the network. Non-success statuses become
    /// [`GlimpseError::Backend`] carrying the backend's message when one is
    /// present; network and parse failures become [`GlimpseError::Transport`].
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;

        let url = format!("{}/search", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<BackendErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.or(body.message))
                .unwrap_or_else(|| GlimpseError::GENERIC_BACKEND_MESSAGE.to_string());
            return Err(GlimpseError::backend(status.as_u16(), message));
        }

        let parsed = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| GlimpseError::Transport(format!("malformed search response: {e}")))?;

        tracing::debug!(
            results = parsed.results.len(),
            page = parsed.pagination.current_page,
            "search backend responded"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Query;

    #[tokio::test]
    async fn test_invalid_queries_never_reach_the_network() {
        // An unroutable base URL: any network attempt would error as
        // Transport, so a Validation error proves the request was stopped
        // before send.
        let client = SearchClient::new("http://[::1]:1/");
        let request = SearchRequest::new(vec![Query::text("   ", "multimodal")], 1, 10);
        let err = client.search(&request).await.unwrap_err();
        assert!(matches!(err, GlimpseError::Validation(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = SearchClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
