//! E2E tests for user registration.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use reqwest::StatusCode;
use serde_json::json;
use sso_service::repositories::UserRepository;
use sso_test_utils::TestAuthServer;

// ============================================================================
// Happy Path
// ============================================================================

/// A new user gets the first ID and a 201.
#[tokio::test]
async fn test_register_happy_path() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "email": "a@x.com",
            "password": "Secret1!",
            "username": "alice"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["user_id"].as_i64(), Some(1));

    Ok(())
}

/// The stored hash is neither the plaintext nor shared between users with
/// the same password.
#[tokio::test]
async fn test_register_stores_salted_hash() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let first = server.register("a@x.com", "Secret1!", "alice").await?;
    let second = server.register("b@x.com", "Secret1!", "bob").await?;

    // Assert
    let first = server.storage().find_user_by_id(first).await?;
    let second = server.storage().find_user_by_id(second).await?;
    assert_ne!(first.password_hash, b"Secret1!".to_vec());
    assert_ne!(first.password_hash, second.password_hash);

    Ok(())
}

// ============================================================================
// Conflicts
// ============================================================================

#[tokio::test]
async fn test_register_duplicate_email_returns_409() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "email": "a@x.com",
            "password": "Other1!",
            "username": "alice2"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "USER_EXISTS");
    assert_eq!(body["error"]["message"], "User already exists");

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_username_returns_409() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "email": "other@x.com",
            "password": "Secret1!",
            "username": "alice"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(server.storage().user_count(), 1);

    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

/// Each missing field is reported by name before the core is called.
#[tokio::test]
async fn test_register_missing_fields_return_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let cases = [
        (
            json!({"email": "", "password": "Secret1!", "username": "alice"}),
            "email is required",
        ),
        (
            json!({"email": "a@x.com", "password": "Secret1!"}),
            "username is required",
        ),
        (
            json!({"email": "a@x.com", "password": "", "username": "alice"}),
            "password is required",
        ),
        (
            json!({"email": "a@x.com", "username": "alice"}),
            "password is required",
        ),
    ];

    for (payload, expected) in cases {
        // Act
        let response = server
            .client()
            .post(format!("{}/api/v1/auth/register", server.url()))
            .json(&payload)
            .send()
            .await?;

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
        assert_eq!(body["error"]["message"], expected);
    }

    assert_eq!(server.storage().user_count(), 0);

    Ok(())
}

/// Passwords past the bcrypt input limit are refused.
#[tokio::test]
async fn test_register_password_too_long_returns_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let password = format!("{}CORRECT", "x".repeat(72));

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({
            "email": "a@x.com",
            "password": password,
            "username": "alice"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "password is too long");
    assert_eq!(server.storage().user_count(), 0);

    Ok(())
}
