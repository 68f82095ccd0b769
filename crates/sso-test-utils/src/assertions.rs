//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for session tokens.

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use sso_service::crypto::TokenClaims;

/// Decode a session token with `secret`, skipping the expiry check.
///
/// Panics if the signature does not verify.
pub fn decode_token_claims(token: &str, secret: &[u8]) -> TokenClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation) {
        Ok(data) => data.claims,
        Err(e) => panic!("Token did not verify with the given secret: {}", e),
    }
}

/// Custom assertions for session tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_signed_with(TEST_APP_SECRET)
///     .assert_for_user(1)
///     .assert_expires_in(3600);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is an HS256 JWT whose signature verifies with `secret`
    fn assert_signed_with(&self, secret: &[u8]) -> &Self;

    /// Assert that the token does NOT verify with `secret`
    fn assert_not_signed_with(&self, secret: &[u8]) -> &Self;

    /// Assert the `uid` claim
    fn assert_for_user(&self, user_id: i64) -> &Self;

    /// Assert the `app_id` claim
    fn assert_for_app(&self, app_id: i32) -> &Self;

    /// Assert the `email` and `username` claims
    fn assert_identity(&self, email: &str, username: &str) -> &Self;

    /// Assert that the token expires `seconds` from now (within 2s)
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

/// Claims read without verifying the signature.
fn unverified_claims(token: &str) -> TokenClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims,
        Err(e) => panic!("Failed to decode token claims: {}", e),
    }
}

impl TokenAssertions for String {
    fn assert_signed_with(&self, secret: &[u8]) -> &Self {
        let header = decode_header(self).expect("Token header should decode");
        assert_eq!(header.alg, Algorithm::HS256, "Expected HS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        decode_token_claims(self, secret);
        self
    }

    fn assert_not_signed_with(&self, secret: &[u8]) -> &Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let result = decode::<TokenClaims>(self, &DecodingKey::from_secret(secret), &validation);
        assert!(
            result.is_err(),
            "Token unexpectedly verified with the given secret"
        );
        self
    }

    fn assert_for_user(&self, user_id: i64) -> &Self {
        let claims = unverified_claims(self);
        assert_eq!(claims.uid, user_id, "Unexpected uid claim");
        self
    }

    fn assert_for_app(&self, app_id: i32) -> &Self {
        let claims = unverified_claims(self);
        assert_eq!(claims.app_id, app_id, "Unexpected app_id claim");
        self
    }

    fn assert_identity(&self, email: &str, username: &str) -> &Self {
        let claims = unverified_claims(self);
        assert_eq!(claims.email, email, "Unexpected email claim");
        assert_eq!(claims.username, username, "Unexpected username claim");
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = unverified_claims(self);
        let expected = chrono::Utc::now().timestamp() + seconds;

        assert!(
            (claims.exp - expected).abs() <= 2,
            "Token exp {} should be within 2s of {}",
            claims.exp,
            expected
        );
        self
    }
}
