//! Tweet domain - DB queries for imported tweets
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&SqlitePool` (for standalone queries) and `&mut SqliteConnection` (for transactions).

use sqlx::{Executor, Sqlite};

use super::super::models::{NewTweet, Tweet};

pub async fn tweet_exists<'e, E>(
    executor: E,
    query_id: i64,
    remote_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tweets WHERE query_id = ? AND remote_id = ?)")
        .bind(query_id)
        .bind(remote_id)
        .fetch_one(executor)
        .await
}

/// Insert a tweet unless `(query_id, remote_id)` is already stored.
///
/// Returns whether a row was written. Existing rows are never touched.
pub async fn insert_tweet<'e, E>(
    executor: E,
    query_id: i64,
    tweet: &NewTweet,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO tweets (
            query_id, remote_id, created_at, text, profile_image_url, user_name, full_name,
            retweeter_profile_image_url, retweeter_user_name, retweeter_full_name
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (query_id, remote_id) DO NOTHING
        "#,
    )
    .bind(query_id)
    .bind(&tweet.remote_id)
    .bind(tweet.created_at)
    .bind(&tweet.text)
    .bind(&tweet.profile_image_url)
    .bind(&tweet.user_name)
    .bind(&tweet.full_name)
    .bind(&tweet.retweeter_profile_image_url)
    .bind(&tweet.retweeter_user_name)
    .bind(&tweet.retweeter_full_name)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Tweets for a query, newest first
pub async fn list_for_query<'e, E>(executor: E, query_id: i64) -> Result<Vec<Tweet>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        r#"
        SELECT id, query_id, remote_id, created_at, text, profile_image_url, user_name, full_name,
               retweeter_profile_image_url, retweeter_user_name, retweeter_full_name
        FROM tweets
        WHERE query_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(query_id)
    .fetch_all(executor)
    .await
}

pub async fn count_for_query<'e, E>(executor: E, query_id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM tweets WHERE query_id = ?")
        .bind(query_id)
        .fetch_one(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::twitter::{QueryType, feed_queries};
    use crate::services::db::memory_pool;
    use chrono::{TimeZone, Utc};

    fn new_tweet(remote_id: &str, text: &str, minute: u32) -> NewTweet {
        NewTweet {
            remote_id: remote_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2013, 5, 1, 12, minute, 0).unwrap(),
            text: text.to_string(),
            profile_image_url: "http://img/a.png".to_string(),
            user_name: "alice".to_string(),
            full_name: "Alice".to_string(),
            retweeter_profile_image_url: None,
            retweeter_user_name: None,
            retweeter_full_name: None,
        }
    }

    #[tokio::test]
    async fn test_insert_is_idempotent_per_query() {
        let db = memory_pool().await;
        let (query, _) = feed_queries::get_or_create_query(&db, QueryType::User, "alice")
            .await
            .unwrap();

        assert!(insert_tweet(&db, query.id, &new_tweet("1", "first", 0)).await.unwrap());
        assert!(!insert_tweet(&db, query.id, &new_tweet("1", "changed", 0)).await.unwrap());
        assert!(tweet_exists(&db, query.id, "1").await.unwrap());
        assert!(!tweet_exists(&db, query.id, "2").await.unwrap());

        let stored = list_for_query(&db, query.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "first");
        assert!(!stored[0].is_retweet());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let db = memory_pool().await;
        let (query, _) = feed_queries::get_or_create_query(&db, QueryType::User, "alice")
            .await
            .unwrap();

        insert_tweet(&db, query.id, &new_tweet("1", "old", 1)).await.unwrap();
        insert_tweet(&db, query.id, &new_tweet("2", "new", 30)).await.unwrap();
        insert_tweet(&db, query.id, &new_tweet("3", "mid", 15)).await.unwrap();

        let texts: Vec<String> = list_for_query(&db, query.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["new", "mid", "old"]);
        assert_eq!(count_for_query(&db, query.id).await.unwrap(), 3);
    }
}
