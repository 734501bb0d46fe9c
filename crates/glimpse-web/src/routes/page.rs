//! The search page itself. Form submissions and pagination links drive the
//! shared `SearchSession`; the page is re-rendered from session state after
//! every action, so the grid always reflects exactly what the session holds.

use std::sync::Arc;

use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use glimpse_core::encode::{is_video_type, QueryEncoder};
use glimpse_core::model::{Query, QueryKind, SearchResult};
use glimpse_core::search::SearchClient;
use glimpse_core::session::SearchSession;
use glimpse_core::GlimpseError;

use crate::error::AppError;
use crate::store;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/search", post(run_search))
        .route("/search/page/{n}", get(go_to_page))
}

#[derive(Template)]
#[template(path = "search.html")]
struct SearchTemplate {
    query: String,
    error: Option<String>,
    searched: bool,
    results: Vec<ResultView>,
    current_page: u32,
    total_pages: u32,
    total_results: u64,
    can_prev: bool,
    can_next: bool,
    prev_page: u32,
    next_page: u32,
}

struct ResultView {
    id: String,
    url: String,
    score: String,
    /// Clip window as `data-` attribute values; `end` is empty when the
    /// result has no end time.
    start: String,
    end: String,
    time_range: Option<String>,
    title: Option<String>,
    description: Option<String>,
    transcript: Option<String>,
}

impl ResultView {
    fn from_result(result: &SearchResult) -> Self {
        let start = result.start_time.unwrap_or(0.0);
        let time_range = result
            .start_time
            .zip(result.end_time)
            .map(|(s, e)| format!("{s:.1}s - {e:.1}s"));
        Self {
            id: result.id.clone(),
            url: result.url.clone(),
            score: format!("{:.4}", result.score),
            start: format!("{start}"),
            end: result.end_time.map(|e| format!("{e}")).unwrap_or_default(),
            time_range,
            title: result.title.clone(),
            description: result.description.clone(),
            transcript: result.transcript.clone(),
        }
    }
}

fn render(
    session: &SearchSession<SearchClient>,
    error: Option<String>,
) -> Result<Html<String>, AppError> {
    let pagination = session.pagination();
    let query = session
        .last_queries()
        .iter()
        .find(|q| q.kind == QueryKind::Text)
        .map(|q| q.value.clone())
        .unwrap_or_default();

    let tmpl = SearchTemplate {
        query,
        error,
        searched: !session.last_queries().is_empty(),
        results: session.results().iter().map(ResultView::from_result).collect(),
        current_page: pagination.current_page,
        total_pages: pagination.total_pages,
        total_results: pagination.total_results,
        can_prev: session.can_go_prev(),
        can_next: session.can_go_next(),
        prev_page: pagination.current_page.saturating_sub(1),
        next_page: pagination.current_page.saturating_add(1),
    };
    Ok(Html(tmpl.render()?))
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let session = state.session.lock().await;
    render(&session, None)
}

/// Fresh search. The form carries the search text, optional image files,
/// and an optional video file; a video takes the upload-search path and
/// supersedes the other inputs, matching the single-query video variant.
async fn run_search(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut encoder = QueryEncoder::new(&state.config.backend.embedding_model);
    let mut notices: Vec<String> = Vec::new();
    let mut video: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("q") => {
                let text = field.text().await?;
                encoder.set_text(text);
            }
            Some("images") => {
                let name = field.file_name().unwrap_or("image").to_string();
                let media_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await?;
                // A file input with no selection still submits an empty part.
                if bytes.is_empty() {
                    continue;
                }
                if bytes.len() as u64 > state.config.upload.max_bytes {
                    notices.push(format!("'{name}' exceeds the upload size limit"));
                    continue;
                }
                if let Err(err) = encoder.add_image(name, media_type, bytes.to_vec()) {
                    notices.push(err.to_string());
                }
            }
            Some("video") => {
                let name = field.file_name().unwrap_or("video").to_string();
                let media_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    video = Some((name, media_type, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    let mut session = state.session.lock().await;

    let outcome = if let Some((name, media_type, bytes)) = video {
        match relay_video(&state, &name, &media_type, &bytes).await {
            Ok(query) => session.search(vec![query]).await,
            // Upload and validation failures never reach the session, so
            // the previous results stay on screen.
            Err(err) => Err(err),
        }
    } else {
        match encoder.encode() {
            Ok(queries) => session.search(queries).await,
            Err(err) => Err(err),
        }
    };

    if let Err(err) = outcome {
        notices.push(err.to_string());
    }
    let error = (!notices.is_empty()).then(|| notices.join(" / "));
    render(&session, error)
}

/// Store the video locally (this instance is its own relay) and build the
/// `url` query the backend will fetch.
async fn relay_video(
    state: &AppState,
    name: &str,
    media_type: &str,
    bytes: &[u8],
) -> glimpse_core::Result<Query> {
    if !is_video_type(media_type) {
        return Err(GlimpseError::Validation(format!(
            "'{name}' is not a video file, please upload a video"
        )));
    }
    if bytes.len() as u64 > state.config.upload.max_bytes {
        return Err(GlimpseError::Validation(format!(
            "'{name}' exceeds the upload size limit"
        )));
    }

    let path = store::save_upload(&state.config.upload.dir, name, bytes).await?;
    Ok(Query::url(
        format!("{}{path}", state.public_base()),
        &state.config.backend.embedding_model,
    ))
}

async fn go_to_page(
    State(state): State<Arc<AppState>>,
    Path(n): Path<u32>,
) -> Result<Html<String>, AppError> {
    let mut session = state.session.lock().await;
    let error = match session.go_to_page(n).await {
        Ok(_) => None,
        // A failed page navigation keeps the current grid.
        Err(err) => Some(err.to_string()),
    };
    render(&session, error)
}
