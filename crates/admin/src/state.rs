//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{AdminConfig, StorageBackend};
use crate::db::{self, InMemoryStorage, RelationalStorage, Storage};
use crate::services::auth::{AuthError, AuthService, PasswordHasher};

/// Errors that can occur while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid password hashing parameters")]
    PasswordHasher(#[from] AuthError),
    #[error("postgres backend selected without a database URL")]
    MissingDatabaseUrl,
}

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    storage: Arc<dyn Storage>,
    hasher: PasswordHasher,
}

impl AppState {
    /// Build state around an already-open storage backend.
    ///
    /// # Errors
    ///
    /// Returns `StateError::PasswordHasher` if the configured Argon2
    /// parameters are invalid.
    pub fn new(config: AdminConfig, storage: Arc<dyn Storage>) -> Result<Self, StateError> {
        let hasher = PasswordHasher::new(config.password_hash)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                hasher,
            }),
        })
    }

    /// Open the storage backend selected by `config` and build state around it.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Database` if the `PostgreSQL` pool cannot connect.
    pub async fn connect(config: AdminConfig) -> Result<Self, StateError> {
        let storage: Arc<dyn Storage> = match config.storage {
            StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_ref()
                    .ok_or(StateError::MissingDatabaseUrl)?;
                let pool = db::create_pool(url).await?;
                Arc::new(RelationalStorage::new(pool))
            }
        };
        tracing::info!(backend = storage.backend_name(), "Storage opened");
        Self::new(config, storage)
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }

    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.inner.hasher
    }

    /// Authentication service over this state's storage and hasher.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.storage(), self.hasher())
    }
}
