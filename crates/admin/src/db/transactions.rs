//! Transaction repository for database operations.
//!
//! Transactions are append-only: there is no update or delete.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kubra_market_core::{Amount, OrderId, PaymentMethod, TransactionId};

use super::RepositoryError;
use crate::models::{NewTransaction, Transaction};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    transaction_id: String,
    order_id: Option<i32>,
    amount: String,
    payment_method: PaymentMethod,
    date: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let amount = Amount::parse(&row.amount).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid amount in transaction {}: {e}",
                row.id
            ))
        })?;

        Ok(Self {
            id: TransactionId::new(row.id),
            transaction_id: row.transaction_id,
            order_id: row.order_id.map(OrderId::new),
            amount,
            payment_method: row.payment_method,
            date: row.date,
        })
    }
}

const TRANSACTION_COLUMNS: &str = "id, transaction_id, order_id, amount, payment_method, date";

/// Repository for transaction database operations.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored amount is invalid.
    pub async fn list(&self) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored amount is invalid.
    pub async fn list_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored amount is invalid.
    pub async fn get_by_id(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            INSERT INTO transactions (transaction_id, order_id, amount, payment_method, date)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(&transaction.transaction_id)
        .bind(transaction.order_id.map(|id| id.as_i32()))
        .bind(transaction.amount)
        .bind(transaction.payment_method)
        .bind(transaction.date)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }
}
