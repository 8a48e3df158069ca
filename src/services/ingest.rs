//! Running a query: fetch statuses and store the ones not seen before

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::config::FeedSettings;
use crate::domain::twitter::{NewTweet, Query, QueryError, feed_queries, tweets};
use crate::services::markup;
use crate::services::twitter::{Endpoint, Status, StatusSource, remote_id, status_entries};

/// `created_at` format used by the 1.1 API, always in UTC
pub const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S +0000 %Y";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Entries in the API response
    pub fetched: usize,
    /// Tweets stored by this run
    pub created: usize,
    /// Entries dropped because they could not be parsed
    pub skipped: usize,
}

/// Fetch new statuses for `query` and store them.
///
/// Tweets already stored for the query are skipped without being parsed.
/// An entry that does not parse is logged and skipped so it can't block the
/// query forever. Inserts and the `interested = false` update share one
/// transaction, so a failed run changes nothing.
pub async fn run_query(
    db: &SqlitePool,
    source: &dyn StatusSource,
    settings: &FeedSettings,
    query: &Query,
) -> Result<RunSummary, QueryError> {
    let kind = query.query_type()?;
    let endpoint = Endpoint::for_query(kind, &query.value);
    let credentials = settings.resolve_credentials(&query.value)?;

    debug!(query_id = query.id, url = %endpoint.full_url(), "Fetching statuses");
    let body = source.fetch(&endpoint, credentials).await?;
    let entries = status_entries(kind, body)?;

    let mut tx = db.begin().await?;
    let mut created = 0;
    let mut skipped = 0;

    for entry in &entries {
        let remote_id = match remote_id(entry) {
            Ok(id) => id,
            Err(e) => {
                warn!(query_id = query.id, "Skipping entry for {}: {}", query, e);
                skipped += 1;
                continue;
            }
        };
        if tweets::tweet_exists(&mut *tx, query.id, &remote_id).await? {
            continue;
        }
        let tweet = match tweet_from_status(remote_id, entry, settings.strip_high_multibyte) {
            Ok(tweet) => tweet,
            Err(e) => {
                warn!(query_id = query.id, "Skipping entry for {}: {}", query, e);
                skipped += 1;
                continue;
            }
        };
        if tweets::insert_tweet(&mut *tx, query.id, &tweet).await? {
            created += 1;
        }
    }

    feed_queries::set_interested(&mut *tx, query.id, false).await?;
    tx.commit().await?;

    let summary = RunSummary {
        fetched: entries.len(),
        created,
        skipped,
    };
    info!(
        query_id = query.id,
        "Ran query {}: {} fetched, {} new, {} skipped",
        query,
        summary.fetched,
        summary.created,
        summary.skipped
    );
    Ok(summary)
}

/// Build the stored form of one status entry.
///
/// For a retweet the outer entry only supplies the retweeter fields; text,
/// author and date come from the original status.
pub fn tweet_from_status(
    remote_id: String,
    entry: &Value,
    strip_high_multibyte: bool,
) -> Result<NewTweet, QueryError> {
    let mut status = Status::deserialize(entry)
        .map_err(|e| QueryError::Retrieve(format!("malformed status {}: {}", remote_id, e)))?;

    let (source, retweeter) = match status.retweeted_status.take() {
        Some(original) => {
            let retweeter = status.user;
            (*original, Some(retweeter))
        }
        None => (status, None),
    };

    let created_at = NaiveDateTime::parse_from_str(&source.created_at, TWITTER_DATE_FORMAT)
        .map_err(|e| {
            QueryError::Retrieve(format!(
                "bad created_at {:?} on status {}: {}",
                source.created_at, remote_id, e
            ))
        })?
        .and_utc();

    let (retweeter_profile_image_url, retweeter_user_name, retweeter_full_name) = match retweeter {
        Some(user) => (
            Some(user.profile_image_url),
            Some(user.screen_name),
            Some(user.name),
        ),
        None => (None, None, None),
    };

    Ok(NewTweet {
        remote_id,
        created_at,
        text: markup::render_text(&source.text, strip_high_multibyte),
        profile_image_url: source.user.profile_image_url,
        user_name: source.user.screen_name,
        full_name: source.user.name,
        retweeter_profile_image_url,
        retweeter_user_name,
        retweeter_full_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::twitter::QueryType;
    use crate::services::db::memory_pool;
    use crate::services::testing::{FixtureSource, settings_with_credentials, status_json};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    async fn user_query(db: &SqlitePool, value: &str) -> Query {
        feed_queries::get_or_create_query(db, QueryType::User, value)
            .await
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn test_new_statuses_are_stored_and_interest_cleared() {
        let db = memory_pool().await;
        let query = user_query(&db, "alice").await;
        let source = FixtureSource::new().with(
            QueryType::User,
            "alice",
            json!([
                status_json(2, "alice", "second #post", "Wed May 01 12:30:00 +0000 2013"),
                status_json(1, "alice", "first", "Wed May 01 12:00:00 +0000 2013"),
            ]),
        );

        let summary = run_query(&db, &source, &settings_with_credentials(), &query)
            .await
            .unwrap();
        assert_eq!(
            summary,
            RunSummary {
                fetched: 2,
                created: 2,
                skipped: 0
            }
        );

        let stored = tweets::list_for_query(&db, query.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].remote_id, "2");
        assert_eq!(
            stored[0].created_at,
            Utc.with_ymd_and_hms(2013, 5, 1, 12, 30, 0).unwrap()
        );
        assert!(stored[0].text.contains("search?q=%23post"));
        assert_eq!(stored[0].full_name, "Full alice");

        let reloaded = feed_queries::get_query(&db, query.id).await.unwrap().unwrap();
        assert!(!reloaded.interested);
    }

    #[tokio::test]
    async fn test_known_remote_id_is_left_untouched() {
        let db = memory_pool().await;
        let query = user_query(&db, "alice").await;
        let settings = settings_with_credentials();

        let first = FixtureSource::new().with(
            QueryType::User,
            "alice",
            json!([status_json(7, "alice", "original text", "Wed May 01 12:00:00 +0000 2013")]),
        );
        run_query(&db, &first, &settings, &query).await.unwrap();

        // Same id comes back edited, and with a date that would not even parse
        let second = FixtureSource::new().with(
            QueryType::User,
            "alice",
            json!([
                status_json(7, "alice", "edited text", "not a date"),
                status_json(8, "alice", "brand new", "Wed May 01 13:00:00 +0000 2013"),
            ]),
        );
        let summary = run_query(&db, &second, &settings, &query).await.unwrap();
        assert_eq!(summary.created, 1);

        let stored = tweets::list_for_query(&db, query.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        let kept = stored.iter().find(|t| t.remote_id == "7").unwrap();
        assert_eq!(kept.text, "original text");
    }

    #[tokio::test]
    async fn test_retweet_fields_come_from_both_levels() {
        let db = memory_pool().await;
        let query = user_query(&db, "bob").await;

        let mut outer = status_json(100, "bob", "RT @carol: hello", "Thu May 02 08:00:00 +0000 2013");
        outer["retweeted_status"] =
            status_json(99, "carol", "hello", "Wed May 01 09:15:00 +0000 2013");
        let source = FixtureSource::new().with(QueryType::User, "bob", json!([outer]));

        run_query(&db, &source, &settings_with_credentials(), &query)
            .await
            .unwrap();

        let stored = tweets::list_for_query(&db, query.id).await.unwrap();
        let tweet = &stored[0];
        assert!(tweet.is_retweet());
        assert_eq!(tweet.remote_id, "100");
        assert_eq!(tweet.retweeter_user_name.as_deref(), Some("bob"));
        assert_eq!(tweet.retweeter_full_name.as_deref(), Some("Full bob"));
        assert_eq!(
            tweet.retweeter_profile_image_url.as_deref(),
            Some("http://img.example/bob.png")
        );
        assert_eq!(tweet.user_name, "carol");
        assert_eq!(tweet.full_name, "Full carol");
        assert_eq!(tweet.profile_image_url, "http://img.example/carol.png");
        assert_eq!(tweet.text, "hello");
        assert_eq!(
            tweet.created_at,
            Utc.with_ymd_and_hms(2013, 5, 1, 9, 15, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_malformed_entries_are_skipped() {
        let db = memory_pool().await;
        let query = user_query(&db, "alice").await;
        let settings = settings_with_credentials();

        let changed_format = status_json(3, "alice", "odd date", "2013-05-01T12:00:00Z");
        let source = FixtureSource::new().with(
            QueryType::User,
            "alice",
            json!([
                status_json(1, "alice", "fine", "Wed May 01 12:00:00 +0000 2013"),
                {"id": 2, "text": "no user or date"},
                changed_format,
                {"text": "no id at all"},
            ]),
        );

        let summary = run_query(&db, &source, &settings, &query).await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                fetched: 4,
                created: 1,
                skipped: 3
            }
        );
        let reloaded = feed_queries::get_query(&db, query.id).await.unwrap().unwrap();
        assert!(!reloaded.interested);

        // The bad entries come back on every run without blocking new ones
        let next = FixtureSource::new().with(
            QueryType::User,
            "alice",
            json!([
                status_json(4, "alice", "newer", "Wed May 01 13:00:00 +0000 2013"),
                {"id": 2, "text": "no user or date"},
            ]),
        );
        let summary = run_query(&db, &next, &settings, &query).await.unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(tweets::count_for_query(&db, query.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_interest_and_stores_nothing() {
        let db = memory_pool().await;
        let query = user_query(&db, "alice").await;

        let err = run_query(&db, &FixtureSource::new(), &settings_with_credentials(), &query)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Retrieve(_)));

        let reloaded = feed_queries::get_query(&db, query.id).await.unwrap().unwrap();
        assert!(reloaded.interested);
        assert_eq!(tweets::count_for_query(&db, query.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let db = memory_pool().await;
        let query = user_query(&db, "alice").await;
        let source = FixtureSource::new().with(
            QueryType::User,
            "alice",
            json!({"errors": [{"message": "Rate limit exceeded", "code": 88}]}),
        );

        let err = run_query(&db, &source, &settings_with_credentials(), &query)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert!(feed_queries::get_query(&db, query.id).await.unwrap().unwrap().interested);
    }

    #[tokio::test]
    async fn test_unknown_type_fails_before_fetching() {
        let db = memory_pool().await;
        sqlx::query("INSERT INTO queries (kind, value, interested) VALUES ('topic', 'x', 1)")
            .execute(&db)
            .await
            .unwrap();
        let query = feed_queries::list_queries(&db).await.unwrap().remove(0);

        let source = FixtureSource::new();
        let err = run_query(&db, &source, &settings_with_credentials(), &query)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidQueryType(ref k) if k == "topic"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_fetching() {
        let db = memory_pool().await;
        let query = user_query(&db, "alice").await;
        let source = FixtureSource::new();

        let err = run_query(&db, &source, &FeedSettings::default(), &query)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingCredentials));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_uses_statuses_envelope() {
        let db = memory_pool().await;
        let (query, _) = feed_queries::get_or_create_query(&db, QueryType::Search, "#rust")
            .await
            .unwrap();
        let source = FixtureSource::new().with(
            QueryType::Search,
            "#rust",
            json!({"statuses": [status_json(5, "dave", "#rust rocks", "Fri May 03 10:00:00 +0000 2013")]}),
        );

        let summary = run_query(&db, &source, &settings_with_credentials(), &query)
            .await
            .unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_strip_setting_applies_to_text() {
        let entry = status_json(1, "eve", "snow ☃", "Wed May 01 12:00:00 +0000 2013");
        let tweet = tweet_from_status("1".to_string(), &entry, true).unwrap();
        assert_eq!(tweet.text, "snow ");
    }
}
