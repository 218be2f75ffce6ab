//! Authentication service.
//!
//! Username and password accounts. The service owns credential checks and
//! user persistence; session state (id cycling, the stored [`CurrentUser`])
//! is handled by the route layer.
//!
//! [`CurrentUser`]: crate::models::CurrentUser

mod error;
mod password;

pub use error::AuthError;
pub use password::{KEY_LEN, PasswordHasher, SALT_LEN};

use kubra_market_core::UserId;

use crate::db::{RepositoryError, Storage};
use crate::error::FieldError;
use crate::models::{NewUser, Profile, User, UserUpdate};

/// Authentication service.
pub struct AuthService<'a> {
    storage: &'a dyn Storage,
    hasher: &'a PasswordHasher,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage, hasher: &'a PasswordHasher) -> Self {
        Self { storage, hasher }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the username or password is blank.
    /// Returns `AuthError::UsernameTaken` if the username is already registered.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        profile: Profile,
    ) -> Result<User, AuthError> {
        validate_credentials(username, password)?;

        if self.storage.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hasher.hash(password).await?;

        // The unique constraint still decides races between two registrations.
        self.storage
            .create_user(NewUser {
                username: username.to_owned(),
                password_hash,
                first_name: profile.first_name,
                last_name: profile.last_name,
                email: profile.email,
                avatar: profile.avatar,
            })
            .await
            .map_err(map_conflict)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.storage.get_user_by_username(username).await? else {
            self.hasher.waste(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if self.hasher.verify(password, &user.password_hash).await? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Reload the session's user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if the user no longer exists.
    pub async fn current_user(&self, id: UserId) -> Result<User, AuthError> {
        self.storage
            .get_user(id)
            .await?
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Update the logged-in user's profile. Passwords cannot be changed here.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a blank username,
    /// `AuthError::UsernameTaken` when renaming onto an existing user, and
    /// `AuthError::NotAuthenticated` if the user no longer exists.
    pub async fn update_profile(&self, id: UserId, changes: UserUpdate) -> Result<User, AuthError> {
        changes.validate().map_err(AuthError::Validation)?;

        self.storage
            .update_user(id, changes)
            .await
            .map_err(map_conflict)?
            .ok_or(AuthError::NotAuthenticated)
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "username is required"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors))
    }
}

fn map_conflict(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(_) => AuthError::UsernameTaken,
        other => AuthError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PasswordHashConfig;
    use crate::db::InMemoryStorage;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let storage = InMemoryStorage::new();
        let hasher = fast_hasher();
        let auth = AuthService::new(&storage, &hasher);

        let user = auth
            .register("alice", "secret123", Profile::default())
            .await
            .unwrap();
        assert_ne!(user.password_hash, "secret123");

        let logged_in = auth.login("alice", "secret123").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let storage = InMemoryStorage::new();
        let hasher = fast_hasher();
        let auth = AuthService::new(&storage, &hasher);
        auth.register("alice", "secret123", Profile::default())
            .await
            .unwrap();

        let missing = auth.login("nouser", "secret123").await.unwrap_err();
        let wrong = auth.login("alice", "wrongpass").await.unwrap_err();
        assert!(matches!(missing, AuthError::InvalidCredentials));
        assert_eq!(missing.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let storage = InMemoryStorage::new();
        let hasher = fast_hasher();
        let auth = AuthService::new(&storage, &hasher);
        auth.register("alice", "secret123", Profile::default())
            .await
            .unwrap();

        let err = auth
            .register("alice", "other", Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let storage = InMemoryStorage::new();
        let hasher = fast_hasher();
        let auth = AuthService::new(&storage, &hasher);

        let err = auth.register(" ", "", Profile::default()).await.unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_update_profile_keeps_password() {
        let storage = InMemoryStorage::new();
        let hasher = fast_hasher();
        let auth = AuthService::new(&storage, &hasher);
        let user = auth
            .register("alice", "secret123", Profile::default())
            .await
            .unwrap();

        let changes: UserUpdate =
            serde_json::from_str(r#"{"firstName": "Alice", "password": "changed"}"#).unwrap();
        let updated = auth.update_profile(user.id, changes).await.unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Alice"));

        assert!(auth.login("alice", "secret123").await.is_ok());
        assert!(auth.login("alice", "changed").await.is_err());
    }

    #[tokio::test]
    async fn test_current_user_missing() {
        let storage = InMemoryStorage::new();
        let hasher = fast_hasher();
        let auth = AuthService::new(&storage, &hasher);

        let err = auth.current_user(UserId::new(42)).await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }
}
