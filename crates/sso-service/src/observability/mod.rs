//! Observability module for the SSO service
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field
//! allow-listing. Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (user IDs, app IDs, operation names)
//! - **HASHED**: Must be SHA-256 hashed for correlation (email)
//! - **NEVER**: Must never appear in logs (passwords, password hashes, app secrets, tokens)

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// This is a one-way hash for correlating log entries, not a protection
/// for secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad credentials
    Authentication,
    /// Conflicts and lookups that found nothing
    Client,
    /// Storage, hashing or signing faults
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Client => "client",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ErrorCategory::Authentication,
            AuthError::UserExists | AuthError::UserNotFound | AuthError::InvalidAppId => {
                ErrorCategory::Client
            }
            AuthError::Internal => ErrorCategory::Internal,
        }
    }
}
