//! User domain types.
//!
//! [`User`] carries the stored password hash and deliberately does not
//! implement `Serialize`; only [`PublicUser`] can be written to a response.

use serde::{Deserialize, Serialize};

use kubra_market_core::{UserId, patch};

use super::Validator;
use crate::error::FieldError;

/// A dashboard user (domain type).
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// `"<hexKey>.<hexSalt>"` produced by the password hasher.
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("avatar", &self.avatar)
            .finish()
    }
}

/// User as returned by the API: every field except the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

/// Fields for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Profile fields accepted alongside credentials at registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Partial profile update.
///
/// There is no password field: a `password` key in the request body is
/// ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub avatar: Option<Option<String>>,
}

impl UserUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
    }

    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns field errors for an empty username.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .required_if_present("username", self.username.as_deref())
            .finish()
    }

    /// Merge the present fields into `user`.
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            username: "alice".to_string(),
            password_hash: "deadbeef.cafe".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            email: Some("alice@example.com".to_string()),
            avatar: None,
        }
    }

    #[test]
    fn test_public_user_omits_password() {
        let json = serde_json::to_value(PublicUser::from(sample_user())).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["firstName"], "Alice");
        assert!(json["lastName"].is_null());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let debug_output = format!("{:?}", sample_user());
        assert!(!debug_output.contains("deadbeef"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_update_ignores_password_field() {
        let update: UserUpdate =
            serde_json::from_str(r#"{"password": "hunter2", "lastName": "Liddell"}"#).unwrap();
        let mut user = sample_user();
        update.apply_to(&mut user);
        assert_eq!(user.password_hash, "deadbeef.cafe");
        assert_eq!(user.last_name.as_deref(), Some("Liddell"));
    }

    #[test]
    fn test_update_null_clears_field() {
        let update: UserUpdate = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert!(!update.is_empty());
        let mut user = sample_user();
        update.apply_to(&mut user);
        assert_eq!(user.email, None);
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_password_only_update_is_empty() {
        let update: UserUpdate = serde_json::from_str(r#"{"password": "x"}"#).unwrap();
        assert!(update.is_empty());
    }
}
