//! PostgreSQL storage for users and applications.
//!
//! Uniqueness of `users.email` and `users.username` is enforced by unique
//! constraints, so concurrent registrations resolve in the database.

use super::{AdminRepository, ApplicationRepository, StorageError, UserRepository};
use crate::models::{App, User};
use async_trait::async_trait;
use sqlx::PgPool;

/// sqlx-backed implementation of all three persistence ports.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map an insert error, surfacing unique violations as `AlreadyExists`.
fn map_insert_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StorageError::AlreadyExists
        }
        other => StorageError::Database(format!("Failed to insert user: {}", other)),
    }
}

#[async_trait]
impl UserRepository for PgStorage {
    async fn save_user(
        &self,
        email: &str,
        password_hash: &[u8],
        username: &str,
    ) -> Result<i64, StorageError> {
        let (user_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (email, password_hash, username)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(user_id)
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, is_admin
            FROM users
            WHERE email = $1 OR username = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Database(format!("Failed to fetch user by login: {}", e)))?
        .ok_or(StorageError::NotFound)
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, is_admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Database(format!("Failed to fetch user by id: {}", e)))?
        .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AdminRepository for PgStorage {
    async fn is_admin_by_id(&self, user_id: i64) -> Result<bool, StorageError> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT is_admin FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to fetch admin flag: {}", e)))?;

        row.map(|(is_admin,)| is_admin).ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ApplicationRepository for PgStorage {
    async fn find_app_by_id(&self, app_id: i32) -> Result<App, StorageError> {
        sqlx::query_as::<_, App>("SELECT id, name, secret FROM apps WHERE id = $1")
            .bind(app_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to fetch app: {}", e)))?
            .ok_or(StorageError::NotFound)
    }
}
