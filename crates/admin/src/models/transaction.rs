//! Payment transaction domain types. Transactions are immutable once recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kubra_market_core::{Amount, OrderId, PaymentMethod, TransactionId};

use super::Validator;
use crate::error::FieldError;

/// A payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    /// External reference such as `TRX-12345`.
    pub transaction_id: String,
    /// Weak reference; the order may no longer exist.
    pub order_id: Option<OrderId>,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
}

/// Fields for recording a transaction. `date` defaults to now.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub transaction_id: String,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    /// # Errors
    ///
    /// Returns field errors for a blank transaction reference.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .required("transactionId", &self.transaction_id)
            .finish()
    }
}
