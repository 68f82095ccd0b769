//! # SSO Test Utilities
//!
//! Shared test utilities for the SSO service.
//!
//! This crate provides:
//! - Fixed test applications, secrets and a low bcrypt cost
//! - Pre-seeded in-memory storage and auth service builders
//! - Server test harness (TestAuthServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sso_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestAuthServer::spawn().await?;
//!     let user_id = server.register("a@x.com", "Secret1!", "alice").await?;
//!     let token = server.login("a@x.com", "Secret1!", TEST_APP_ID).await?;
//!
//!     token
//!         .assert_signed_with(TEST_APP_SECRET)
//!         .assert_for_user(user_id)
//!         .assert_for_app(TEST_APP_ID);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
