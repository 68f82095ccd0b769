//! Persistence ports consumed by the authentication core.
//!
//! The core depends on storage only through these three traits. Two
//! implementations ship with the crate:
//!
//! - [`postgres::PgStorage`] - PostgreSQL via sqlx
//! - [`mock::InMemoryStorage`] - in-process store for tests and local runs

pub mod mock;
pub mod postgres;

use crate::models::{App, User};
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a storage implementation.
///
/// `NotFound` and `AlreadyExists` must be distinguishable from other
/// failures so the core can classify them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Database error: {0}")]
    Database(String),
}

/// User lookup and creation.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return its assigned ID.
    ///
    /// Fails with `StorageError::AlreadyExists` if the email or username is
    /// already taken. Implementations must enforce this atomically.
    async fn save_user(
        &self,
        email: &str,
        password_hash: &[u8],
        username: &str,
    ) -> Result<i64, StorageError>;

    /// Find the user whose email matches `email` OR whose username matches
    /// `username`.
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<User, StorageError>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<User, StorageError>;
}

/// Admin flag lookup.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn is_admin_by_id(&self, user_id: i64) -> Result<bool, StorageError>;
}

/// Application lookup.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn find_app_by_id(&self, app_id: i32) -> Result<App, StorageError>;
}
