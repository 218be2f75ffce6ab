//! Storage for the admin API.
//!
//! # Backends
//!
//! Handlers only see the [`Storage`] trait. Two implementations exist:
//!
//! - [`InMemoryStorage`] - process-local tables, used for development and tests
//! - [`RelationalStorage`] - `PostgreSQL`, one repository per table
//!
//! Both behave the same to callers: ids are assigned by the backend and never
//! reused, "not found" is `None`/`false` rather than an error, and an update
//! with no fields returns the current row without writing.
//!
//! ## Tables
//!
//! - `users` - Dashboard users (unique `username`)
//! - `shop_categories`, `shops`, `orders`, `transactions`
//! - `tower_sessions.session` - Session storage
//!
//! References between tables (`shops.category_id`, `orders.shop_id`,
//! `transactions.order_id`) carry no foreign keys: deleting a category or shop
//! leaves dangling ids that readers resolve to display fallbacks.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p kubra-market-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod postgres;
pub mod seed;
pub mod sessions;
pub mod shop_categories;
pub mod shops;
pub mod transactions;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use kubra_market_core::{OrderId, ShopCategoryId, ShopId, TransactionId, UserId};

use crate::models::{
    NewOrder, NewShop, NewShopCategory, NewTransaction, NewUser, Order, OrderUpdate, Shop,
    ShopCategory, ShopCategoryUpdate, ShopUpdate, Transaction, User, UserUpdate,
};

pub use memory::InMemoryStorage;
pub use postgres::RelationalStorage;
pub use sessions::{MemorySessionStore, SessionBackend, SweepingSessionStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// An in-memory id sequence ran out of values.
    #[error("id sequence exhausted for {0}")]
    IdExhausted(&'static str),
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// CRUD and query operations over the five entity collections.
///
/// # Errors
///
/// Every method returns `RepositoryError::Database` when the backend fails.
/// `create_user` and `update_user` return `RepositoryError::Conflict` when the
/// username is already taken.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Session store living next to this backend's data.
    fn session_store(&self) -> SessionBackend;

    /// Check that the backend can serve requests.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // Users
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn get_user_by_username(&self, username: &str)
    -> Result<Option<User>, RepositoryError>;
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn update_user(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<User>, RepositoryError>;

    // Shop categories
    async fn list_shop_categories(&self) -> Result<Vec<ShopCategory>, RepositoryError>;
    async fn get_shop_category(
        &self,
        id: ShopCategoryId,
    ) -> Result<Option<ShopCategory>, RepositoryError>;
    async fn create_shop_category(
        &self,
        category: NewShopCategory,
    ) -> Result<ShopCategory, RepositoryError>;
    async fn update_shop_category(
        &self,
        id: ShopCategoryId,
        changes: ShopCategoryUpdate,
    ) -> Result<Option<ShopCategory>, RepositoryError>;
    async fn delete_shop_category(&self, id: ShopCategoryId) -> Result<bool, RepositoryError>;

    // Shops
    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError>;
    async fn list_shops_by_category(
        &self,
        category_id: ShopCategoryId,
    ) -> Result<Vec<Shop>, RepositoryError>;
    async fn get_shop(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError>;
    async fn create_shop(&self, shop: NewShop) -> Result<Shop, RepositoryError>;
    async fn update_shop(
        &self,
        id: ShopId,
        changes: ShopUpdate,
    ) -> Result<Option<Shop>, RepositoryError>;
    async fn delete_shop(&self, id: ShopId) -> Result<bool, RepositoryError>;

    // Orders
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn list_orders_by_shop(&self, shop_id: ShopId) -> Result<Vec<Order>, RepositoryError>;
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;
    async fn update_order(
        &self,
        id: OrderId,
        changes: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError>;

    // Transactions
    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepositoryError>;
    async fn list_transactions_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Transaction>, RepositoryError>;
    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError>;
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, RepositoryError>;
}
