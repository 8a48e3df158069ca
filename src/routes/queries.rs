//! Query management endpoints (/queries/*)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use super::dto::{QueryDetailResponse, TweetResponse};
use crate::AppState;
use crate::domain::twitter::{self, feed_queries, tweets};
use crate::services::error::{LogErr, LogRunErr};
use crate::services::ingest::{RunSummary, run_query};
use crate::services::poller::{PollSummary, poll_queries};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/queries", get(list_queries))
        .route("/queries/poll", post(poll))
        .route("/queries/{id}", get(get_query))
        .route("/queries/{id}/run", post(run))
}

/// GET /queries - All stored queries, newest first
async fn list_queries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<twitter::Query>>, StatusCode> {
    let queries = feed_queries::list_queries(&state.db)
        .await
        .log_500("List queries error")?;
    Ok(Json(queries))
}

/// GET /queries/{id} - A query and its stored tweets
async fn get_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<QueryDetailResponse>, StatusCode> {
    let query = feed_queries::get_query(&state.db, id)
        .await
        .log_500("Get query error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    let tweets = tweets::list_for_query(&state.db, id)
        .await
        .log_500("List tweets error")?;

    Ok(Json(QueryDetailResponse {
        query,
        tweets: tweets.into_iter().map(TweetResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
struct PollParams {
    #[serde(default)]
    force: bool,
}

/// POST /queries/poll - Run interested queries (all of them with force=true)
async fn poll(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PollParams>,
) -> Result<Json<PollSummary>, StatusCode> {
    let summary = poll_queries(&state, params.force)
        .await
        .log_500("Poll error")?;
    Ok(Json(summary))
}

/// POST /queries/{id}/run - Run one query now
async fn run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RunSummary>, StatusCode> {
    let query = feed_queries::get_query(&state.db, id)
        .await
        .log_500("Get query error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    let summary = run_query(&state.db, state.source.as_ref(), &state.settings, &query)
        .await
        .log_run_err("Run query error")?;
    Ok(Json(summary))
}
