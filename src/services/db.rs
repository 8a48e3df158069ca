//! Database pool and schema setup
//!
//! Domain query functions use sqlx's generic Executor trait, so they accept
//! both `&SqlitePool` and `&mut SqliteConnection` (a transaction):
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! tweets::insert_tweet(&mut *tx, query_id, &tweet).await?;
//! feed_queries::set_interested(&mut *tx, query_id, false).await?;
//! tx.commit().await?;
//! ```

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS queries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        value TEXT NOT NULL,
        interested INTEGER NOT NULL DEFAULT 1,
        UNIQUE (kind, value)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tweets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        query_id INTEGER NOT NULL REFERENCES queries (id) ON DELETE CASCADE,
        remote_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        text TEXT NOT NULL,
        profile_image_url TEXT NOT NULL,
        user_name TEXT NOT NULL,
        full_name TEXT NOT NULL,
        retweeter_profile_image_url TEXT,
        retweeter_user_name TEXT,
        retweeter_full_name TEXT,
        UNIQUE (query_id, remote_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_tweets_query_created
        ON tweets (query_id, created_at DESC)
    "#,
];

/// Open the pool and make sure the schema exists.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    init_schema(&pool).await?;
    info!("Database ready at {}", database_url);
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Single-connection in-memory pool; every connection would otherwise get
/// its own empty database.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    init_schema(&pool).await.expect("create schema");
    pool
}
