//! Twitter feed importer: stored queries, de-duplicated tweets, polling and
//! a small JSON API over the imported feeds.

pub mod config;
pub mod domain;
pub mod routes;
pub mod services;

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::FeedSettings;
use services::twitter::StatusSource;

pub struct AppState {
    pub db: SqlitePool,
    pub source: Arc<dyn StatusSource>,
    pub settings: Arc<FeedSettings>,
}

impl AppState {
    pub fn new(db: SqlitePool, source: Arc<dyn StatusSource>, settings: FeedSettings) -> Self {
        Self {
            db,
            source,
            settings: Arc::new(settings),
        }
    }
}

/// Build the HTTP application
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::build_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
