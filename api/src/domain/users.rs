//! User domain - DB queries for users
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_premium: bool,
    pub posters: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert a new user, returning the generated id.
pub async fn create_user<'e, E>(
    executor: E,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(executor)
    .await?;

    Ok(row.0)
}

pub async fn get_user_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        "SELECT id, name, email, password_hash, is_premium, posters, created_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn get_user_by_id<'e, E>(executor: E, user_id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        "SELECT id, name, email, password_hash, is_premium, posters, created_at
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Flip the premium flag. Returns false when the user was already premium
/// (the WHERE clause makes the upgrade race-safe).
pub async fn set_premium<'e, E>(executor: E, user_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("UPDATE users SET is_premium = TRUE WHERE id = $1 AND NOT is_premium")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Append a hosted poster URL to the user's list. Append-only, no dedup.
pub async fn append_poster<'e, E>(executor: E, user_id: i64, url: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET posters = array_append(posters, $2) WHERE id = $1")
        .bind(user_id)
        .bind(url)
        .execute(executor)
        .await?;

    Ok(())
}
