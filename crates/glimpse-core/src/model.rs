use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GlimpseError, Result};

/// The three ways a search input can be expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Text,
    Url,
    Base64,
}

/// One typed unit of search input. A list of queries describes a single
/// logical request; multiple queries are combined, not alternated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "type")]
    pub kind: QueryKind,
    pub value: String,
    pub embedding_model: String,
}

impl Query {
    pub fn text(value: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Text,
            value: value.into(),
            embedding_model: embedding_model.into(),
        }
    }

    pub fn url(value: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Url,
            value: value.into(),
            embedding_model: embedding_model.into(),
        }
    }

    pub fn base64(value: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Base64,
            value: value.into(),
            embedding_model: embedding_model.into(),
        }
    }

    /// Check the per-kind value rules. Runs before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_model.is_empty() {
            return Err(GlimpseError::Validation(
                "query has no embedding model".into(),
            ));
        }
        match self.kind {
            QueryKind::Text => {
                if self.value.trim().is_empty() {
                    return Err(GlimpseError::Validation(
                        "text query cannot be empty".into(),
                    ));
                }
            }
            QueryKind::Url => {
                url::Url::parse(&self.value)
                    .map_err(|e| GlimpseError::Validation(format!("invalid query URL: {e}")))?;
            }
            QueryKind::Base64 => {
                base64::engine::general_purpose::STANDARD
                    .decode(&self.value)
                    .map_err(|e| {
                        GlimpseError::Validation(format!("invalid base64 payload: {e}"))
                    })?;
            }
        }
        Ok(())
    }
}

/// Validate a whole query list. An empty list is itself a validation error:
/// there is nothing to search for.
pub fn validate_queries(queries: &[Query]) -> Result<()> {
    if queries.is_empty() {
        return Err(GlimpseError::Validation(
            "search requires at least one query".into(),
        ));
    }
    for query in queries {
        query.validate()?;
    }
    Ok(())
}

/// One `key operator value` triple of the backend's structured filter syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub key: String,
    pub operator: String,
    pub value: String,
}

/// Boolean AND of filter conditions, serialized as `{"AND": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(rename = "AND")]
    pub and: Vec<FilterCondition>,
}

impl FilterSet {
    /// Restrict results to the video modality. The front end attaches this
    /// to every outbound request.
    pub fn video_only() -> Self {
        Self {
            and: vec![FilterCondition {
                key: "modality".into(),
                operator: "eq".into(),
                value: "video".into(),
            }],
        }
    }
}

/// The request body sent to the search backend. `offset_position` is
/// redundant with `page`; [`SearchRequest::new`] keeps them consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub queries: Vec<Query>,
    pub page: u32,
    pub offset_position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSet>,
}

impl SearchRequest {
    /// Build a request for `page` (1-based), deriving the result offset from
    /// the page size.
    pub fn new(queries: Vec<Query>, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        Self {
            queries,
            page,
            offset_position: (page - 1) * page_size,
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: Option<FilterSet>) -> Self {
        self.filters = filters;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_queries(&self.queries)
    }
}

/// One ranked hit from the backend, camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub url: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Pagination metadata as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub pagination: Pagination,
}
