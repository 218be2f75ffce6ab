//! Integration tests for Kubra Market.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no services needed)
//! cargo test -p kubra-market-integration-tests
//!
//! # Include PostgreSQL contract tests
//! TEST_DATABASE_URL=postgres://... cargo test -p kubra-market-integration-tests -- --include-ignored
//! ```
//!
//! Each [`TestContext`] runs its own admin server on an ephemeral port with
//! in-memory storage and a cookie-keeping HTTP client.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, Response};
use secrecy::SecretString;
use serde_json::{Value, json};

use kubra_market_admin::config::{AdminConfig, PasswordHashConfig};
use kubra_market_admin::db::{self, InMemoryStorage, RelationalStorage};
use kubra_market_admin::routes;
use kubra_market_admin::state::AppState;

/// Argon2 parameters cheap enough for tests.
#[must_use]
pub const fn fast_hash_config() -> PasswordHashConfig {
    PasswordHashConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}

/// In-memory configuration with cheap hashing.
#[must_use]
pub fn test_config() -> AdminConfig {
    let mut config = AdminConfig::in_memory();
    config.password_hash = fast_hash_config();
    config
}

/// A running admin server plus a client that keeps cookies.
pub struct TestContext {
    pub client: Client,
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestContext {
    /// Start a server with default test configuration.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Start a server with the given configuration and empty in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn with_config(config: AdminConfig) -> Self {
        let state = AppState::new(config, Arc::new(InMemoryStorage::new()))
            .expect("valid test state");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let app = routes::app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server error");
        });

        Self {
            client: Self::new_client(),
            addr,
            state,
        }
    }

    /// A fresh client with its own cookie jar, for a second "browser".
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn new_client() -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("build reqwest client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request")
    }

    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT request")
    }

    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request")
    }

    /// Register `username` and keep the resulting session.
    ///
    /// # Panics
    ///
    /// Panics if registration does not return 201.
    pub async fn register(&self, username: &str, password: &str) -> Value {
        let response = self
            .post(
                "/api/register",
                &json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(response.status(), 201, "registration of {username} failed");
        response.json().await.expect("JSON body")
    }

    /// Register a throwaway user so later requests are authenticated.
    pub async fn authenticate(&self) -> Value {
        self.register("operator", "operator-pass").await
    }
}

/// Open relational storage on `TEST_DATABASE_URL` and apply migrations.
///
/// Returns `None` when the variable is not set.
///
/// # Panics
///
/// Panics if the database is unreachable or migrations fail.
pub async fn postgres_storage() -> Option<RelationalStorage> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(RelationalStorage::new(pool))
}

/// A name that will not collide with rows left by earlier runs.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("{prefix}-{nanos}")
}
