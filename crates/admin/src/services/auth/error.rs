//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::FieldError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown username. The two are never distinguished.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No logged-in user, or the session's user no longer exists.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Username already registered.
    #[error("Username already exists")]
    UsernameTaken,

    /// Registration or profile fields failed validation.
    #[error("invalid user data")]
    Validation(Vec<FieldError>),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Key derivation failed.
    #[error("password hashing error")]
    PasswordHash,

    /// The blocking hashing task panicked or was cancelled.
    #[error("password hashing task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
