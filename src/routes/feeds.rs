//! Feed endpoints (/tweets/*)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use super::dto::FeedResponse;
use crate::AppState;
use crate::services::{error::LogErr, feed};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tweets/default", get(default_feed))
        .route("/tweets/user/{name}", get(user_feed))
        .route("/tweets/list/{list_id}", get(list_feed))
        .route("/tweets/search/{term}", get(search_feed))
}

#[derive(Deserialize)]
struct FeedParams {
    limit: Option<usize>,
}

/// GET /tweets/default - The configured default feed
async fn default_feed(State(state): State<Arc<AppState>>) -> Result<Json<FeedResponse>, StatusCode> {
    let tweets = feed::default_tweets(&state)
        .await
        .log_500("Default feed error")?;
    Ok(Json(tweets.into()))
}

/// GET /tweets/user/{name} - A user's timeline
async fn user_feed(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, StatusCode> {
    let tweets = feed::tweets_for_user(&state, &name, params.limit)
        .await
        .log_500("User feed error")?;
    Ok(Json(tweets.into()))
}

/// GET /tweets/list/{list_id} - A list, at most one tweet per author
async fn list_feed(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, StatusCode> {
    let tweets = feed::tweets_for_list(&state, &list_id, params.limit)
        .await
        .log_500("List feed error")?;
    Ok(Json(tweets.into()))
}

/// GET /tweets/search/{term} - Search results
async fn search_feed(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, StatusCode> {
    let tweets = feed::tweets_for_search(&state, &term, params.limit)
        .await
        .log_500("Search feed error")?;
    Ok(Json(tweets.into()))
}
