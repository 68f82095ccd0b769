//! E2E tests for login and token minting.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use reqwest::StatusCode;
use serde_json::json;
use sso_test_utils::{
    TestAuthServer, TokenAssertions, OTHER_APP_ID, OTHER_APP_SECRET, TEST_APP_ID,
    TEST_APP_SECRET, TEST_TOKEN_TTL_SECONDS,
};

// ============================================================================
// Happy Path
// ============================================================================

/// Register then login yields a token carrying the registered identity.
#[tokio::test]
async fn test_login_after_register_returns_token_with_claims() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let user_id = server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({
            "email": "a@x.com",
            "password": "Secret1!",
            "app_id": TEST_APP_ID,
            "username": "alice"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Response should include token"))?
        .to_string();

    token
        .assert_signed_with(TEST_APP_SECRET)
        .assert_for_user(user_id)
        .assert_for_app(TEST_APP_ID)
        .assert_identity("a@x.com", "alice")
        .assert_expires_in(TEST_TOKEN_TTL_SECONDS);

    Ok(())
}

/// Username alone identifies the account.
#[tokio::test]
async fn test_login_by_username_succeeds() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let user_id = server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({
            "password": "Secret1!",
            "app_id": TEST_APP_ID,
            "username": "alice"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    token.assert_for_user(user_id);

    Ok(())
}

/// Tokens are signed with the secret of the requested application only.
#[tokio::test]
async fn test_login_token_is_scoped_to_app() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let token = server.login("a@x.com", "Secret1!", OTHER_APP_ID).await?;

    // Assert
    token
        .assert_signed_with(OTHER_APP_SECRET)
        .assert_not_signed_with(TEST_APP_SECRET)
        .assert_for_app(OTHER_APP_ID);

    Ok(())
}

// ============================================================================
// Failures
// ============================================================================

/// Unknown account and wrong password produce identical responses.
#[tokio::test]
async fn test_login_unknown_user_and_wrong_password_are_indistinguishable(
) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let unknown = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({"email": "nobody@x.com", "password": "Secret1!", "app_id": TEST_APP_ID}))
        .send()
        .await?;
    let unknown_status = unknown.status();
    let unknown_body: serde_json::Value = unknown.json().await?;

    let wrong = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({"email": "a@x.com", "password": "Wrong1!", "app_id": TEST_APP_ID}))
        .send()
        .await?;
    let wrong_status = wrong.status();
    let wrong_body: serde_json::Value = wrong.json().await?;

    // Assert
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["error"]["message"], "Invalid email or password");

    Ok(())
}

/// A missing application is an internal failure, not a distinct error.
#[tokio::test]
async fn test_login_unknown_app_returns_500() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register("a@x.com", "Secret1!", "alice").await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({"email": "a@x.com", "password": "Secret1!", "app_id": 404}))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

    Ok(())
}

/// Extra bytes past the bcrypt input limit still count.
#[tokio::test]
async fn test_login_wrong_password_sharing_long_prefix_returns_401() -> Result<(), anyhow::Error>
{
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let prefix = "x".repeat(72);
    server.register("a@x.com", &prefix, "alice").await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({
            "email": "a@x.com",
            "password": format!("{prefix}WRONG"),
            "app_id": TEST_APP_ID
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// Type errors in the body use the standard error shape.
#[tokio::test]
async fn test_login_malformed_body_returns_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({"email": "a@x.com", "password": "Secret1!", "app_id": "1"}))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert_eq!(body["error"]["message"], "request body is malformed");

    Ok(())
}

#[tokio::test]
async fn test_login_missing_fields_return_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let cases = [
        (
            json!({"password": "Secret1!", "app_id": TEST_APP_ID}),
            "email or username is required",
        ),
        (
            json!({"email": "a@x.com", "app_id": TEST_APP_ID}),
            "password is required",
        ),
        (
            json!({"email": "a@x.com", "password": "Secret1!"}),
            "app_id is required",
        ),
        (
            json!({"email": "a@x.com", "password": "Secret1!", "app_id": 0}),
            "app_id is required",
        ),
    ];

    for (payload, expected) in cases {
        // Act
        let response = server
            .client()
            .post(format!("{}/api/v1/auth/login", server.url()))
            .json(&payload)
            .send()
            .await?;

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["message"], expected);
    }

    Ok(())
}
