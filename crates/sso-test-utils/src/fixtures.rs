//! Fixed test data and builders.
//!
//! All values are constants so failures reproduce exactly.

use sso_service::models::App;
use sso_service::repositories::mock::InMemoryStorage;
use sso_service::services::{AuthConfig, AuthService};
use std::sync::Arc;

/// Application present in every seeded store.
pub const TEST_APP_ID: i32 = 1;
pub const TEST_APP_NAME: &str = "test";
pub const TEST_APP_SECRET: &[u8] = b"test-secret";

/// Second application, for per-app signing tests.
pub const OTHER_APP_ID: i32 = 2;
pub const OTHER_APP_NAME: &str = "other";
pub const OTHER_APP_SECRET: &[u8] = b"other-secret";

/// Lowest cost bcrypt accepts; keeps hashing fast in debug builds.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Token lifetime used by test services.
pub const TEST_TOKEN_TTL_SECONDS: i64 = 3600;

pub fn test_app() -> App {
    App {
        id: TEST_APP_ID,
        name: TEST_APP_NAME.to_string(),
        secret: TEST_APP_SECRET.to_vec(),
    }
}

pub fn other_app() -> App {
    App {
        id: OTHER_APP_ID,
        name: OTHER_APP_NAME.to_string(),
        secret: OTHER_APP_SECRET.to_vec(),
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        token_ttl: chrono::Duration::seconds(TEST_TOKEN_TTL_SECONDS),
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

/// In-memory store holding both test applications and no users.
pub fn seeded_storage() -> Arc<InMemoryStorage> {
    Arc::new(InMemoryStorage::with_apps([test_app(), other_app()]))
}

/// Auth service over `storage` with the test configuration.
pub fn test_auth_service(storage: Arc<InMemoryStorage>) -> AuthService {
    AuthService::from_storage(storage, test_auth_config())
}
