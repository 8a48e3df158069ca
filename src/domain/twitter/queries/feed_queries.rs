//! Query domain - DB queries for stored feed queries
//!
//! Single-statement functions use the generic Executor pattern, allowing them
//! to work with both `&SqlitePool` and `&mut SqliteConnection` (transactions).

use sqlx::{Executor, Sqlite, SqlitePool};

use super::super::models::{Query, QueryType};

/// Look up the query for `(kind, value)`, creating it when missing.
///
/// Returns the query and whether this call created it. The UNIQUE constraint
/// on `(kind, value)` makes concurrent callers agree on one row.
pub async fn get_or_create_query(
    db: &SqlitePool,
    kind: QueryType,
    value: &str,
) -> Result<(Query, bool), sqlx::Error> {
    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO queries (kind, value, interested)
        VALUES (?, ?, 1)
        ON CONFLICT (kind, value) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(kind.as_str())
    .bind(value)
    .fetch_optional(db)
    .await?;

    let query = sqlx::query_as(
        r#"
        SELECT id, kind, value, interested
        FROM queries
        WHERE kind = ? AND value = ?
        "#,
    )
    .bind(kind.as_str())
    .bind(value)
    .fetch_one(db)
    .await?;

    Ok((query, inserted.is_some()))
}

pub async fn get_query<'e, E>(executor: E, id: i64) -> Result<Option<Query>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as("SELECT id, kind, value, interested FROM queries WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// All queries, newest first
pub async fn list_queries<'e, E>(executor: E) -> Result<Vec<Query>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as("SELECT id, kind, value, interested FROM queries ORDER BY id DESC")
        .fetch_all(executor)
        .await
}

/// Queries flagged for the next poll, newest first
pub async fn list_interested_queries<'e, E>(executor: E) -> Result<Vec<Query>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as(
        r#"
        SELECT id, kind, value, interested
        FROM queries
        WHERE interested = 1
        ORDER BY id DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn set_interested<'e, E>(
    executor: E,
    query_id: i64,
    interested: bool,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE queries SET interested = ? WHERE id = ?")
        .bind(interested)
        .bind(query_id)
        .execute(executor)
        .await?;
    Ok(())
}
