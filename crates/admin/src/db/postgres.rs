//! `PostgreSQL` storage backend.

use async_trait::async_trait;
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use kubra_market_core::{OrderId, ShopCategoryId, ShopId, TransactionId, UserId};

use super::orders::OrderRepository;
use super::shop_categories::ShopCategoryRepository;
use super::shops::ShopRepository;
use super::transactions::TransactionRepository;
use super::users::UserRepository;
use super::{RepositoryError, SessionBackend, Storage};
use crate::models::{
    NewOrder, NewShop, NewShopCategory, NewTransaction, NewUser, Order, OrderUpdate, Shop,
    ShopCategory, ShopCategoryUpdate, ShopUpdate, Transaction, User, UserUpdate,
};

/// Storage backed by a `PostgreSQL` pool.
///
/// Sessions are kept in the same database (`tower_sessions.session`).
#[derive(Debug, Clone)]
pub struct RelationalStorage {
    pool: PgPool,
    sessions: SessionBackend,
}

impl RelationalStorage {
    /// Wrap an existing pool. Migrations must already have run.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let sessions = SessionBackend::new(PostgresStore::new(pool.clone()));
        Self { pool, sessions }
    }
}

#[async_trait]
impl Storage for RelationalStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn session_store(&self) -> SessionBackend {
        self.sessions.clone()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool)
            .get_by_username(username)
            .await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        UserRepository::new(&self.pool).create(&user).await
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).update(id, changes).await
    }

    async fn list_shop_categories(&self) -> Result<Vec<ShopCategory>, RepositoryError> {
        ShopCategoryRepository::new(&self.pool).list().await
    }

    async fn get_shop_category(
        &self,
        id: ShopCategoryId,
    ) -> Result<Option<ShopCategory>, RepositoryError> {
        ShopCategoryRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_shop_category(
        &self,
        category: NewShopCategory,
    ) -> Result<ShopCategory, RepositoryError> {
        ShopCategoryRepository::new(&self.pool)
            .create(&category)
            .await
    }

    async fn update_shop_category(
        &self,
        id: ShopCategoryId,
        changes: ShopCategoryUpdate,
    ) -> Result<Option<ShopCategory>, RepositoryError> {
        ShopCategoryRepository::new(&self.pool)
            .update(id, changes)
            .await
    }

    async fn delete_shop_category(&self, id: ShopCategoryId) -> Result<bool, RepositoryError> {
        ShopCategoryRepository::new(&self.pool).delete(id).await
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        ShopRepository::new(&self.pool).list().await
    }

    async fn list_shops_by_category(
        &self,
        category_id: ShopCategoryId,
    ) -> Result<Vec<Shop>, RepositoryError> {
        ShopRepository::new(&self.pool)
            .list_by_category(category_id)
            .await
    }

    async fn get_shop(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        ShopRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_shop(&self, shop: NewShop) -> Result<Shop, RepositoryError> {
        ShopRepository::new(&self.pool).create(&shop).await
    }

    async fn update_shop(
        &self,
        id: ShopId,
        changes: ShopUpdate,
    ) -> Result<Option<Shop>, RepositoryError> {
        ShopRepository::new(&self.pool).update(id, changes).await
    }

    async fn delete_shop(&self, id: ShopId) -> Result<bool, RepositoryError> {
        ShopRepository::new(&self.pool).delete(id).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).list().await
    }

    async fn list_orders_by_shop(&self, shop_id: ShopId) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).list_by_shop(shop_id).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        OrderRepository::new(&self.pool).create(&order).await
    }

    async fn update_order(
        &self,
        id: OrderId,
        changes: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).update(id, changes).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepositoryError> {
        TransactionRepository::new(&self.pool).list().await
    }

    async fn list_transactions_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        TransactionRepository::new(&self.pool)
            .list_by_order(order_id)
            .await
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        TransactionRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        TransactionRepository::new(&self.pool)
            .create(&transaction)
            .await
    }
}
