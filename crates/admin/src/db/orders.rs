//! Order repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use kubra_market_core::{Amount, OrderId, OrderStatus, ShopId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderUpdate};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    customer_name: String,
    customer_email: Option<String>,
    shop_id: Option<i32>,
    amount: String,
    status: OrderStatus,
    date: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let amount = Amount::parse(&row.amount).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid amount in order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            shop_id: row.shop_id.map(ShopId::new),
            amount,
            status: row.status,
            date: row.date,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, order_number, customer_name, customer_email, shop_id, amount, status, date";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored amount is invalid.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the orders placed with one shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored amount is invalid.
    pub async fn list_by_shop(&self, shop_id: ShopId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE shop_id = $1 ORDER BY id"
        ))
        .bind(shop_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored amount is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert an order. A missing date becomes the database's `NOW()`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (order_number, customer_name, customer_email, shop_id, amount, status, date)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.shop_id.map(|id| id.as_i32()))
        .bind(order.amount)
        .bind(order.status)
        .bind(order.date)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Apply a partial update. An empty update reads the row unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: OrderId,
        changes: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError> {
        if changes.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE orders SET ");
        {
            let mut set = query.separated(", ");
            if let Some(order_number) = changes.order_number {
                set.push("order_number = ").push_bind_unseparated(order_number);
            }
            if let Some(customer_name) = changes.customer_name {
                set.push("customer_name = ").push_bind_unseparated(customer_name);
            }
            if let Some(customer_email) = changes.customer_email {
                set.push("customer_email = ").push_bind_unseparated(customer_email);
            }
            if let Some(shop_id) = changes.shop_id {
                set.push("shop_id = ")
                    .push_bind_unseparated(shop_id.map(|id| id.as_i32()));
            }
            if let Some(amount) = changes.amount {
                set.push("amount = ").push_bind_unseparated(amount);
            }
            if let Some(status) = changes.status {
                set.push("status = ").push_bind_unseparated(status);
            }
            if let Some(date) = changes.date {
                set.push("date = ").push_bind_unseparated(date);
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id.as_i32())
            .push(format!(" RETURNING {ORDER_COLUMNS}"));

        let row = query
            .build_query_as::<OrderRow>()
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }
}
