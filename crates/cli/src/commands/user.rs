//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! KM_USER_PASSWORD='...' km-cli user create -u alice --email alice@example.com
//! km-cli hash-password '...'
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string
//! - `PASSWORD_HASH_*` - Argon2 cost, shared with the server

use secrecy::{ExposeSecret, SecretString};

use kubra_market_admin::config::AdminConfig;
use kubra_market_admin::db::{RepositoryError, Storage};
use kubra_market_admin::models::NewUser;
use kubra_market_admin::services::PasswordHasher;

use super::{CommandError, connect};

/// Arguments for `user create`.
pub struct CreateUser {
    pub username: String,
    pub password: SecretString,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Create a dashboard user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError::UserExists` if the username is taken.
pub async fn create(args: CreateUser) -> Result<i32, CommandError> {
    if args.username.trim().is_empty() {
        return Err(CommandError::InvalidArgument("username is empty".to_owned()));
    }
    if args.password.expose_secret().is_empty() {
        return Err(CommandError::InvalidArgument("password is empty".to_owned()));
    }

    let (config, storage) = connect().await?;
    let hasher = PasswordHasher::new(config.password_hash)?;

    tracing::info!("Creating user: {}", args.username);

    let password_hash = hasher.hash(args.password.expose_secret()).await?;
    let user = storage
        .create_user(NewUser {
            username: args.username.clone(),
            password_hash,
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            avatar: None,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CommandError::UserExists(args.username.clone()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );
    Ok(user.id.as_i32())
}

/// Print the stored form of a password.
///
/// Uses the `PASSWORD_HASH_*` cost settings when set.
///
/// # Errors
///
/// Returns an error if the configuration or hashing fails.
pub fn hash_password(password: &SecretString) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();
    let config = AdminConfig::from_env()?;
    let hasher = PasswordHasher::new(config.password_hash)?;

    let stored = hasher.hash_blocking(password.expose_secret())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{stored}");
    }
    Ok(())
}
