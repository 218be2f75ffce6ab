//! Password hashing.
//!
//! Stored format is `"<hexKey>.<hexSalt>"`: a 64-byte Argon2id key derived
//! from the password and a random 16-byte salt. Derivation is CPU and memory
//! heavy, so the async entry points run it on the blocking pool.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::AuthError;
use crate::config::PasswordHashConfig;

/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 64;

/// Length of the random salt in bytes.
pub const SALT_LEN: usize = 16;

/// Argon2id password hasher with fixed cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Build a hasher from cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if Argon2 rejects the parameters.
    pub fn new(config: PasswordHashConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|_| AuthError::PasswordHash)?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if derivation fails, or
    /// `AuthError::Worker` if the blocking task dies.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password)).await?
    }

    /// Check a password against a stored value.
    ///
    /// A malformed stored value is a mismatch, not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if derivation fails, or
    /// `AuthError::Worker` if the blocking task dies.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let stored = stored.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &stored)).await?
    }

    /// Spend one derivation without comparing anything.
    ///
    /// Used when the username does not exist so both login failures cost the
    /// same.
    ///
    /// # Errors
    ///
    /// Same as [`PasswordHasher::verify`].
    pub async fn waste(&self, password: &str) -> Result<(), AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.derive(&password, &[0u8; SALT_LEN]).map(drop))
            .await?
    }

    /// Synchronous [`PasswordHasher::hash`], for the CLI.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if derivation fails.
    pub fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let key = self.derive(password, &salt)?;
        Ok(format!("{}.{}", hex::encode(key), hex::encode(salt)))
    }

    /// Synchronous [`PasswordHasher::verify`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if derivation fails.
    pub fn verify_blocking(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let Some((key_hex, salt_hex)) = stored.split_once('.') else {
            return Ok(false);
        };
        let (Ok(expected), Ok(salt)) = (hex::decode(key_hex), hex::decode(salt_hex)) else {
            return Ok(false);
        };
        if expected.len() != KEY_LEN || salt.len() != SALT_LEN {
            return Ok(false);
        }

        let actual = self.derive(password, &salt)?;
        Ok(constant_time_eq(&actual, &expected))
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], AuthError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut key = [0u8; KEY_LEN];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|_| AuthError::PasswordHash)?;
        Ok(key)
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_format() {
        let stored = fast_hasher().hash_blocking("secret123").unwrap();
        let (key, salt) = stored.split_once('.').unwrap();
        assert_eq!(key.len(), KEY_LEN * 2);
        assert_eq!(salt.len(), SALT_LEN * 2);
    }

    #[test]
    fn test_verify_roundtrip() {
        let hasher = fast_hasher();
        let stored = hasher.hash_blocking("secret123").unwrap();
        assert!(hasher.verify_blocking("secret123", &stored).unwrap());
        assert!(!hasher.verify_blocking("secret124", &stored).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let hasher = fast_hasher();
        let a = hasher.hash_blocking("secret123").unwrap();
        let b = hasher.hash_blocking("secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_value_is_mismatch() {
        let hasher = fast_hasher();
        for stored in ["", "nodot", "zz.yy", "abcd.", ".abcd", "abcd.abcd"] {
            assert!(!hasher.verify_blocking("anything", stored).unwrap(), "{stored}");
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let result = PasswordHasher::new(PasswordHashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AuthError::PasswordHash)));
    }

    #[tokio::test]
    async fn test_async_entry_points() {
        let hasher = fast_hasher();
        let stored = hasher.hash("secret123").await.unwrap();
        assert!(hasher.verify("secret123", &stored).await.unwrap());
        hasher.waste("secret123").await.unwrap();
    }
}
