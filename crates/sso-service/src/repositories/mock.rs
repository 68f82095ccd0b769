//! In-memory storage implementing all three persistence ports.
//!
//! Used by unit tests, the test server harness, and local runs without a
//! database. Mirrors the PostgreSQL semantics: IDs start at 1, email and
//! username are unique, and lookups distinguish "not found".

use super::{AdminRepository, ApplicationRepository, StorageError, UserRepository};
use crate::models::{App, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    users: Vec<User>,
    apps: HashMap<i32, App>,
    next_user_id: i64,
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct InMemoryStorage {
    state: Mutex<State>,
    /// Whether every call should fail with `StorageError::Database`.
    return_error: bool,
    /// Number of application lookups made.
    app_lookups: AtomicUsize,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with applications.
    pub fn with_apps(apps: impl IntoIterator<Item = App>) -> Self {
        let state = State {
            apps: apps.into_iter().map(|app| (app.id, app)).collect(),
            ..State::default()
        };

        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Create a store whose every operation fails with a database error.
    pub fn failing() -> Self {
        Self {
            return_error: true,
            ..Self::default()
        }
    }

    /// Add or replace an application.
    pub fn insert_app(&self, app: App) -> Result<(), StorageError> {
        self.lock()?.apps.insert(app.id, app);
        Ok(())
    }

    /// Set a user's admin flag.
    pub fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StorageError::NotFound)?;
        user.is_admin = is_admin;
        Ok(())
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.lock().map(|state| state.users.len()).unwrap_or(0)
    }

    /// Get the number of application lookups made.
    pub fn app_lookups(&self) -> usize {
        self.app_lookups.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        if self.return_error {
            return Err(StorageError::Database(
                "Mock storage configured to fail".to_string(),
            ));
        }

        self.state
            .lock()
            .map_err(|_| StorageError::Database("Storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStorage {
    async fn save_user(
        &self,
        email: &str,
        password_hash: &[u8],
        username: &str,
    ) -> Result<i64, StorageError> {
        let mut state = self.lock()?;

        if state
            .users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            return Err(StorageError::AlreadyExists);
        }

        state.next_user_id += 1;
        let id = state.next_user_id;
        state.users.push(User {
            id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_vec(),
            is_admin: false,
        });

        Ok(id)
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<User, StorageError> {
        self.lock()?
            .users
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<User, StorageError> {
        self.lock()?
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AdminRepository for InMemoryStorage {
    async fn is_admin_by_id(&self, user_id: i64) -> Result<bool, StorageError> {
        self.lock()?
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.is_admin)
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryStorage {
    async fn find_app_by_id(&self, app_id: i32) -> Result<App, StorageError> {
        self.app_lookups.fetch_add(1, Ordering::SeqCst);

        self.lock()?
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}
