//! Password hashing and session token minting.
//!
//! Both halves are leaf operations with no knowledge of storage. Errors are
//! reported as [`CryptoError`] and classified by the caller.

use crate::models::{App, User};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Password exceeds {MAX_PASSWORD_BYTES} bytes")]
    PasswordTooLong,

    /// The stored hash is not a structurally valid bcrypt hash.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

// ============================================================================
// Password Hashing
// ============================================================================

/// bcrypt only reads this many bytes of input; longer passwords would be
/// silently truncated, so they are refused instead.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with bcrypt at the given cost.
///
/// Each call draws a fresh random salt, so hashing the same password twice
/// yields different outputs. The result is the bcrypt modular-crypt string
/// as bytes.
///
/// # Errors
///
/// - `CryptoError::PasswordTooLong` if `password` exceeds [`MAX_PASSWORD_BYTES`]
/// - `CryptoError::Hash` if bcrypt rejects the cost or fails internally
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<Vec<u8>, CryptoError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(CryptoError::PasswordTooLong);
    }

    bcrypt::hash(password, cost)
        .map(String::into_bytes)
        .map_err(|e| CryptoError::Hash(e.to_string()))
}

/// Verify a password against a stored bcrypt hash.
///
/// A mismatch is `Ok(false)`, not an error. A password longer than
/// [`MAX_PASSWORD_BYTES`] can never have been hashed, so it never matches.
///
/// # Errors
///
/// Returns `CryptoError::MalformedHash` if `hash` is not valid UTF-8 or not
/// a parseable bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &[u8]) -> Result<bool, CryptoError> {
    let hash = std::str::from_utf8(hash)
        .map_err(|e| CryptoError::MalformedHash(format!("hash is not UTF-8: {}", e)))?;

    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    bcrypt::verify(password, hash).map_err(|e| CryptoError::MalformedHash(e.to_string()))
}

// ============================================================================
// Token Minting
// ============================================================================

/// Claims carried by a session token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub uid: i64,
    pub email: String,
    pub username: String,
    pub app_id: i32,
    pub exp: i64,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("uid", &self.uid)
            .field("email", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("exp", &self.exp)
            .finish()
    }
}

impl TokenClaims {
    /// Build claims for `user` scoped to `app`, expiring `ttl` after `issued_at`.
    ///
    /// `ttl` may be zero or negative, which yields an already-expired token.
    pub fn new(user: &User, app: &App, ttl: Duration, issued_at: DateTime<Utc>) -> Self {
        Self {
            uid: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            app_id: app.id,
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

/// Mint an HS256 session token for `user`, signed with `app`'s secret.
pub fn mint_token(user: &User, app: &App, ttl: Duration) -> Result<String, CryptoError> {
    mint_token_at(user, app, ttl, Utc::now())
}

/// Mint a token with an explicit mint time.
///
/// # Errors
///
/// Returns `CryptoError::Signing` if the JWT library fails to encode.
#[instrument(skip_all, fields(app_id = app.id))]
pub fn mint_token_at(
    user: &User,
    app: &App,
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, CryptoError> {
    let claims = TokenClaims::new(user, app, ttl, issued_at);

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, &claims, &EncodingKey::from_secret(&app.secret))
        .map_err(|e| CryptoError::Signing(e.to_string()))
}
