//! Seed `PostgreSQL` with the same sample data the in-memory backend uses.

use secrecy::ExposeSecret;

use kubra_market_admin::db::seed::seed_sample_data;
use kubra_market_admin::services::PasswordHasher;

use super::{CommandError, connect};

/// Seed sample data. Safe to run repeatedly.
///
/// The admin password comes from `ADMIN_SEED_PASSWORD`.
///
/// # Errors
///
/// Returns an error if configuration, hashing or any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let (config, storage) = connect().await?;

    let hasher = PasswordHasher::new(config.password_hash)?;
    let admin_hash = hasher
        .hash(config.seed_admin_password.expose_secret())
        .await?;

    let summary = seed_sample_data(&storage, admin_hash).await?;

    tracing::info!(
        users = summary.users,
        shop_categories = summary.shop_categories,
        shops = summary.shops,
        orders = summary.orders,
        transactions = summary.transactions,
        "Seeding complete"
    );
    Ok(())
}
