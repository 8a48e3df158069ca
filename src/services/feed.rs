//! Feed reads: lazily create queries on first access and return their tweets

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::AppState;
use crate::domain::twitter::{QueryType, Tweet, feed_queries, tweets};
use crate::services::ingest::run_query;

/// Tweets for `(kind, value)`, creating and running the query when new.
///
/// A query seen before is only run again when the cache layer is active;
/// otherwise it is flagged for the next poll. A failing run is logged and
/// yields no tweets.
pub async fn tweets_for(
    state: &AppState,
    kind: QueryType,
    value: &str,
    per_user: Option<usize>,
    limit: Option<usize>,
) -> Result<Vec<Tweet>, sqlx::Error> {
    let value = value.trim_matches(|c| c == '"' || c == '\'');
    let (query, created) = feed_queries::get_or_create_query(&state.db, kind, value).await?;

    if created || state.settings.cache_active {
        if let Err(e) = run_query(&state.db, state.source.as_ref(), &state.settings, &query).await {
            warn!(query_id = query.id, "Feed run for {} failed: {}", query, e);
            return Ok(Vec::new());
        }
    } else if !query.interested {
        debug!(query_id = query.id, "Flagging {} for the next poll", query);
        feed_queries::set_interested(&state.db, query.id, true).await?;
    }

    let mut result = tweets::list_for_query(&state.db, query.id).await?;
    if let Some(per_user) = per_user {
        result = cap_per_user(result, per_user);
    }
    if let Some(limit) = limit {
        result.truncate(limit);
    }
    Ok(result)
}

pub async fn tweets_for_user(
    state: &AppState,
    user_name: &str,
    limit: Option<usize>,
) -> Result<Vec<Tweet>, sqlx::Error> {
    tweets_for(state, QueryType::User, user_name, None, limit).await
}

/// List feeds show at most one tweet per author
pub async fn tweets_for_list(
    state: &AppState,
    list_id: &str,
    limit: Option<usize>,
) -> Result<Vec<Tweet>, sqlx::Error> {
    tweets_for(state, QueryType::List, list_id, Some(1), limit).await
}

pub async fn tweets_for_search(
    state: &AppState,
    term: &str,
    limit: Option<usize>,
) -> Result<Vec<Tweet>, sqlx::Error> {
    tweets_for(state, QueryType::Search, term, None, limit).await
}

/// The configured default feed
pub async fn default_tweets(state: &AppState) -> Result<Vec<Tweet>, sqlx::Error> {
    let settings = &state.settings;
    tweets_for(
        state,
        settings.default_query_type,
        &settings.default_query,
        None,
        Some(settings.default_num_tweets),
    )
    .await
}

/// Keep the first `per_user` tweets of each author (input is newest first),
/// then order the survivors newest first.
pub fn cap_per_user(tweets: Vec<Tweet>, per_user: usize) -> Vec<Tweet> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Tweet> = tweets
        .into_iter()
        .filter(|tweet| {
            let count = seen.entry(tweet.user_name.clone()).or_default();
            if *count < per_user {
                *count += 1;
                true
            } else {
                false
            }
        })
        .collect();
    kept.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    kept
}
