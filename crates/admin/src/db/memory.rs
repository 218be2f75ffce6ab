//! In-memory storage backend.
//!
//! One `RwLock`-guarded table per collection. Every mutation happens under the
//! table's write lock, so id allocation and the row insert are a single step.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use kubra_market_core::{OrderId, ShopCategoryId, ShopId, TransactionId, UserId};

use super::{MemorySessionStore, RepositoryError, SessionBackend, Storage};
use crate::models::{
    NewOrder, NewShop, NewShopCategory, NewTransaction, NewUser, Order, OrderUpdate, Shop,
    ShopCategory, ShopCategoryUpdate, ShopUpdate, Transaction, User, UserUpdate,
};

/// A collection keyed by id. Ids come from a per-table counter that only
/// moves forward, so deleted ids are never handed out again and iteration
/// order is insertion order.
#[derive(Debug)]
struct Table<T> {
    name: &'static str,
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T: Clone> Table<T> {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> Result<T, RepositoryError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or(RepositoryError::IdExhausted(self.name))?;
        let row = build(id);
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    fn update(&mut self, id: i32, apply: impl FnOnce(&mut T)) -> Option<T> {
        let row = self.rows.get_mut(&id)?;
        apply(row);
        Some(row.clone())
    }

    fn remove(&mut self, id: i32) -> bool {
        self.rows.remove(&id).is_some()
    }
}

/// Storage backend that keeps everything in process memory.
///
/// Data is lost on restart. Sessions live in a [`MemorySessionStore`].
#[derive(Debug)]
pub struct InMemoryStorage {
    users: RwLock<Table<User>>,
    shop_categories: RwLock<Table<ShopCategory>>,
    shops: RwLock<Table<Shop>>,
    orders: RwLock<Table<Order>>,
    transactions: RwLock<Table<Transaction>>,
    sessions: MemorySessionStore,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Table::new("users")),
            shop_categories: RwLock::new(Table::new("shop_categories")),
            shops: RwLock::new(Table::new("shops")),
            orders: RwLock::new(Table::new("orders")),
            transactions: RwLock::new(Table::new("transactions")),
            sessions: MemorySessionStore::new(),
        }
    }
}

fn username_conflict() -> RepositoryError {
    RepositoryError::Conflict("username already exists".to_owned())
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn session_store(&self) -> SessionBackend {
        SessionBackend::new(self.sessions.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(id.as_i32()))
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .filter(|u| u.username == username)
            .into_iter()
            .next())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.rows.values().any(|u| u.username == user.username) {
            return Err(username_conflict());
        }
        users.insert_with(|id| User {
            id: UserId::new(id),
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            avatar: user.avatar,
        })
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let mut users = self.users.write().await;
        if changes.is_empty() {
            return Ok(users.get(id.as_i32()));
        }
        if let Some(username) = &changes.username
            && users
                .rows
                .values()
                .any(|u| u.username == *username && u.id != id)
        {
            return Err(username_conflict());
        }
        Ok(users.update(id.as_i32(), |user| changes.apply_to(user)))
    }

    // =========================================================================
    // Shop categories
    // =========================================================================

    async fn list_shop_categories(&self) -> Result<Vec<ShopCategory>, RepositoryError> {
        Ok(self.shop_categories.read().await.all())
    }

    async fn get_shop_category(
        &self,
        id: ShopCategoryId,
    ) -> Result<Option<ShopCategory>, RepositoryError> {
        Ok(self.shop_categories.read().await.get(id.as_i32()))
    }

    async fn create_shop_category(
        &self,
        category: NewShopCategory,
    ) -> Result<ShopCategory, RepositoryError> {
        self.shop_categories
            .write()
            .await
            .insert_with(|id| ShopCategory {
                id: ShopCategoryId::new(id),
                name: category.name,
                description: category.description,
                image: category.image,
            })
    }

    async fn update_shop_category(
        &self,
        id: ShopCategoryId,
        changes: ShopCategoryUpdate,
    ) -> Result<Option<ShopCategory>, RepositoryError> {
        let mut categories = self.shop_categories.write().await;
        if changes.is_empty() {
            return Ok(categories.get(id.as_i32()));
        }
        Ok(categories.update(id.as_i32(), |category| changes.apply_to(category)))
    }

    async fn delete_shop_category(&self, id: ShopCategoryId) -> Result<bool, RepositoryError> {
        Ok(self.shop_categories.write().await.remove(id.as_i32()))
    }

    // =========================================================================
    // Shops
    // =========================================================================

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        Ok(self.shops.read().await.all())
    }

    async fn list_shops_by_category(
        &self,
        category_id: ShopCategoryId,
    ) -> Result<Vec<Shop>, RepositoryError> {
        Ok(self
            .shops
            .read()
            .await
            .filter(|shop| shop.category_id == Some(category_id)))
    }

    async fn get_shop(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        Ok(self.shops.read().await.get(id.as_i32()))
    }

    async fn create_shop(&self, shop: NewShop) -> Result<Shop, RepositoryError> {
        self.shops.write().await.insert_with(|id| Shop {
            id: ShopId::new(id),
            name: shop.name,
            description: shop.description,
            image: shop.image,
            address: shop.address,
            category_id: shop.category_id,
        })
    }

    async fn update_shop(
        &self,
        id: ShopId,
        changes: ShopUpdate,
    ) -> Result<Option<Shop>, RepositoryError> {
        let mut shops = self.shops.write().await;
        if changes.is_empty() {
            return Ok(shops.get(id.as_i32()));
        }
        Ok(shops.update(id.as_i32(), |shop| changes.apply_to(shop)))
    }

    async fn delete_shop(&self, id: ShopId) -> Result<bool, RepositoryError> {
        Ok(self.shops.write().await.remove(id.as_i32()))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.orders.read().await.all())
    }

    async fn list_orders_by_shop(&self, shop_id: ShopId) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .orders
            .read()
            .await
            .filter(|order| order.shop_id == Some(shop_id)))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(id.as_i32()))
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.orders.write().await.insert_with(|id| Order {
            id: OrderId::new(id),
            order_number: order.order_number,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            shop_id: order.shop_id,
            amount: order.amount,
            status: order.status,
            date: order.date.unwrap_or_else(Utc::now),
        })
    }

    async fn update_order(
        &self,
        id: OrderId,
        changes: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.write().await;
        if changes.is_empty() {
            return Ok(orders.get(id.as_i32()));
        }
        Ok(orders.update(id.as_i32(), |order| changes.apply_to(order)))
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepositoryError> {
        Ok(self.transactions.read().await.all())
    }

    async fn list_transactions_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        Ok(self
            .transactions
            .read()
            .await
            .filter(|transaction| transaction.order_id == Some(order_id)))
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        Ok(self.transactions.read().await.get(id.as_i32()))
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        self.transactions.write().await.insert_with(|id| Transaction {
            id: TransactionId::new(id),
            transaction_id: transaction.transaction_id,
            order_id: transaction.order_id,
            amount: transaction.amount,
            payment_method: transaction.payment_method,
            date: transaction.date.unwrap_or_else(Utc::now),
        })
    }
}
