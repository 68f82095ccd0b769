//! Test server harness for E2E testing
//!
//! Provides TestAuthServer for spawning real SSO server instances in tests.
//! The server runs the production router over in-memory storage, so no
//! database is required.

use crate::fixtures::{seeded_storage, test_auth_service};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use sso_service::models::{LoginResponse, RegisterResponse};
use sso_service::repositories::mock::InMemoryStorage;
use sso_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Request deadline used by test servers.
pub const TEST_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Test harness for spawning the SSO server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_register_e2e() -> Result<(), anyhow::Error> {
///     let server = TestAuthServer::spawn().await?;
///
///     let response = server
///         .client()
///         .post(format!("{}/api/v1/auth/register", server.url()))
///         .json(&body)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 201);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    storage: Arc<InMemoryStorage>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn a server over freshly seeded in-memory storage
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_storage(seeded_storage()).await
    }

    /// Spawn a server over the given storage
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Use the low test bcrypt cost
    /// - Start the HTTP server in the background
    pub async fn spawn_with_storage(storage: Arc<InMemoryStorage>) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState {
            auth: test_auth_service(storage.clone()),
            request_timeout: TEST_REQUEST_TIMEOUT,
        });

        // Each test gets its own recorder; nothing is installed globally.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            storage,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the backing storage, for seeding and inspection
    pub fn storage(&self) -> &Arc<InMemoryStorage> {
        &self.storage
    }

    /// Shared HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Register a user over HTTP and return the new user ID
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<i64, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/v1/auth/register", self.url()))
            .json(&json!({
                "email": email,
                "password": password,
                "username": username,
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: RegisterResponse = response.json().await?;
        Ok(body.user_id)
    }

    /// Log in over HTTP by email and return the session token
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: i32,
    ) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/v1/auth/login", self.url()))
            .json(&json!({
                "email": email,
                "password": password,
                "app_id": app_id,
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: LoginResponse = response.json().await?;
        Ok(body.token)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
