//! Authentication core.
//!
//! Orchestrates password hashing, storage lookups and token minting for
//! registration, login and identity queries. Storage is reached only through
//! the traits in [`crate::repositories`], injected at construction.
//!
//! Every collaborator failure is logged with its detail and then classified
//! into an [`AuthError`] kind; no storage or library detail is returned.

use crate::crypto::{self, CryptoError};
use crate::errors::AuthError;
use crate::models::UserProfile;
use crate::observability::metrics::{
    record_error, record_login, record_password_hash_duration, record_registration,
    record_token_issued,
};
use crate::observability::{hash_for_correlation, ErrorCategory};
use crate::repositories::{AdminRepository, ApplicationRepository, StorageError, UserRepository};
use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

/// Password hashed once to equalize timing when no user matches a login.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalization-dummy-password";

/// Settings handed to the core at construction.
#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    /// Lifetime of minted session tokens.
    pub token_ttl: Duration,
    /// bcrypt cost for new password hashes.
    pub bcrypt_cost: u32,
}

/// The authentication core.
///
/// Cheap to clone; all clones share the same collaborators.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    admins: Arc<dyn AdminRepository>,
    apps: Arc<dyn ApplicationRepository>,
    config: AuthConfig,
    dummy_hash: Arc<OnceCell<Vec<u8>>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        admins: Arc<dyn AdminRepository>,
        apps: Arc<dyn ApplicationRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            admins,
            apps,
            config,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Build a service whose three ports are served by one store.
    pub fn from_storage<S>(storage: Arc<S>, config: AuthConfig) -> Self
    where
        S: UserRepository + AdminRepository + ApplicationRepository + 'static,
    {
        Self::new(storage.clone(), storage.clone(), storage, config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a new user.
    ///
    /// # Steps
    ///
    /// 1. Hash the password off the async runtime
    /// 2. Persist `{email, hash, username}`
    /// 3. Return the assigned user ID
    ///
    /// # Errors
    ///
    /// - `UserExists` if the email or username is taken
    /// - `Internal` for hashing or storage faults
    #[instrument(skip_all, fields(op = "auth.register_new_user"))]
    pub async fn register_new_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<i64, AuthError> {
        let result = self.register_inner(email, password, username).await;

        record_registration(status_label(&result));
        observe_error("register", &result);
        result
    }

    async fn register_inner(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<i64, AuthError> {
        debug!(
            target: "sso.service.auth",
            email_hash = %hash_for_correlation(email),
            "Registering user"
        );

        let password_hash = self.hash_password(password).await?;

        let user_id = self
            .users
            .save_user(email, &password_hash, username)
            .await
            .map_err(|e| match e {
                StorageError::AlreadyExists => {
                    warn!(
                        target: "sso.service.auth",
                        email_hash = %hash_for_correlation(email),
                        "User already exists"
                    );
                    AuthError::UserExists
                }
                other => {
                    error!(target: "sso.service.auth", error = %other, "Failed to save user");
                    AuthError::Internal
                }
            })?;

        info!(target: "sso.service.auth", user_id, "User registered");
        Ok(user_id)
    }

    /// Check credentials and mint a session token for `app_id`.
    ///
    /// The user is matched by email OR username. An unknown user and a wrong
    /// password both yield `InvalidCredentials`, and both run one bcrypt
    /// verification so their timing matches.
    ///
    /// # Steps
    ///
    /// 1. Look up the user by email or username
    /// 2. Verify the password against the stored hash
    /// 3. Look up the application
    /// 4. Mint a token signed with the application's secret
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown user or wrong password
    /// - `Internal` for a missing application, a malformed stored hash, or
    ///   storage, hashing or signing faults
    #[instrument(skip_all, fields(op = "auth.login", app_id = app_id))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: i32,
        username: &str,
    ) -> Result<String, AuthError> {
        let start = Instant::now();
        let result = self.login_inner(email, password, app_id, username).await;

        record_login(status_label(&result), start.elapsed());
        observe_error("login", &result);
        result
    }

    async fn login_inner(
        &self,
        email: &str,
        password: &str,
        app_id: i32,
        username: &str,
    ) -> Result<String, AuthError> {
        let user = match self
            .users
            .find_user_by_email_or_username(email, username)
            .await
        {
            Ok(user) => user,
            Err(StorageError::NotFound) => {
                self.equalize_login_timing(password).await;
                warn!(
                    target: "sso.service.auth",
                    email_hash = %hash_for_correlation(email),
                    "Login failed: user not found"
                );
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(target: "sso.service.auth", error = %e, "Failed to look up user");
                return Err(AuthError::Internal);
            }
        };

        if !self.verify_password(password, user.password_hash.clone()).await? {
            warn!(target: "sso.service.auth", user_id = user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let app = self.apps.find_app_by_id(app_id).await.map_err(|e| {
            error!(target: "sso.service.auth", app_id, error = %e, "Failed to look up app");
            AuthError::Internal
        })?;

        let token = crypto::mint_token(&user, &app, self.config.token_ttl).map_err(|e| {
            error!(target: "sso.service.auth", app_id, error = %e, "Failed to mint token");
            AuthError::Internal
        })?;

        record_token_issued();
        info!(target: "sso.service.auth", user_id = user.id, app_id, "User logged in");
        Ok(token)
    }

    /// Fetch a user by ID, without the password hash.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if no user has this ID
    /// - `Internal` for storage faults
    #[instrument(skip_all, fields(op = "auth.get_user", user_id = user_id))]
    pub async fn get_user(&self, user_id: i64) -> Result<UserProfile, AuthError> {
        let result = self
            .users
            .find_user_by_id(user_id)
            .await
            .map(UserProfile::from)
            .map_err(|e| match e {
                StorageError::NotFound => {
                    warn!(target: "sso.service.auth", user_id, "User not found");
                    AuthError::UserNotFound
                }
                other => {
                    error!(target: "sso.service.auth", user_id, error = %other, "Failed to get user");
                    AuthError::Internal
                }
            });

        observe_error("get_user", &result);
        result
    }

    /// Report whether a user has the admin flag.
    ///
    /// A missing user is reported as `InvalidAppId`; existing callers depend
    /// on that mapping.
    #[instrument(skip_all, fields(op = "auth.is_admin", user_id = user_id))]
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        let result = self.admins.is_admin_by_id(user_id).await.map_err(|e| match e {
            StorageError::NotFound => {
                warn!(target: "sso.service.auth", user_id, "Admin check for unknown user");
                AuthError::InvalidAppId
            }
            other => {
                error!(target: "sso.service.auth", user_id, error = %other, "Failed to check admin flag");
                AuthError::Internal
            }
        });

        if let Ok(is_admin) = result {
            debug!(target: "sso.service.auth", user_id, is_admin, "Checked admin flag");
        }
        observe_error("is_admin", &result);
        result
    }

    async fn hash_password(&self, password: &str) -> Result<Vec<u8>, AuthError> {
        let password = SecretString::from(password);
        let cost = self.config.bcrypt_cost;

        let start = Instant::now();
        let joined = tokio::task::spawn_blocking(move || {
            crypto::hash_password(password.expose_secret(), cost)
        })
        .await;
        record_password_hash_duration("hash", start.elapsed());

        flatten_blocking(joined, "Password hashing failed")
    }

    async fn verify_password(&self, password: &str, hash: Vec<u8>) -> Result<bool, AuthError> {
        let password = SecretString::from(password);

        let start = Instant::now();
        let joined = tokio::task::spawn_blocking(move || {
            crypto::verify_password(password.expose_secret(), &hash)
        })
        .await;
        record_password_hash_duration("verify", start.elapsed());

        flatten_blocking(joined, "Password verification failed")
    }

    /// Spend one bcrypt verification when no user matched.
    async fn equalize_login_timing(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(TIMING_DUMMY_PASSWORD))
            .await;

        if let Ok(dummy) = dummy {
            let _ = self.verify_password(password, dummy.clone()).await;
        }
    }
}

/// Unwrap a blocking crypto task, classifying both failure layers as `Internal`.
fn flatten_blocking<T>(
    joined: Result<Result<T, CryptoError>, tokio::task::JoinError>,
    context: &'static str,
) -> Result<T, AuthError> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(target: "sso.service.auth", error = %e, "{}", context);
            Err(AuthError::Internal)
        }
        Err(e) => {
            error!(target: "sso.service.auth", error = %e, "{}: blocking task failed", context);
            Err(AuthError::Internal)
        }
    }
}

fn status_label<T>(result: &Result<T, AuthError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}

fn observe_error<T>(operation: &str, result: &Result<T, AuthError>) {
    if let Err(e) = result {
        record_error(operation, ErrorCategory::from(e).as_str());
    }
}
