mod error;
mod routes;
mod store;

use std::sync::Arc;

use anyhow::Result;
use glimpse_core::config::GlimpseConfig;
use glimpse_core::model::FilterSet;
use glimpse_core::search::SearchClient;
use glimpse_core::session::SearchSession;
use tokio::sync::Mutex;

pub struct AppState {
    pub config: GlimpseConfig,
    pub search: SearchClient,
    /// The one search session this instance serves. Glimpse is a
    /// single-user local tool; the mutex is what makes page navigation
    /// single-flight.
    pub session: Mutex<SearchSession<SearchClient>>,
}

impl AppState {
    pub fn from_config(config: GlimpseConfig) -> Self {
        let search = SearchClient::new(&config.backend.url);
        let filters = config.backend.video_only.then(FilterSet::video_only);
        let session = Mutex::new(SearchSession::new(
            search.clone(),
            config.backend.page_size,
            filters,
        ));
        Self {
            config,
            search,
            session,
        }
    }

    /// Base URL this instance is reachable at, used to absolutize
    /// `/uploads/...` paths handed to the search backend.
    pub fn public_base(&self) -> String {
        format!("http://{}:{}", self.config.web.host, self.config.web.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glimpse_web=info".parse().unwrap()),
        )
        .init();

    let config = GlimpseConfig::load(None).unwrap_or_else(|_| GlimpseConfig::default());
    tokio::fs::create_dir_all(&config.upload.dir).await?;

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::from_config(config));

    let app = routes::router(&state.config)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive());

    tracing::info!("glimpse-web listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
