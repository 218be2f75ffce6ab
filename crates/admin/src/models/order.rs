//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kubra_market_core::{Amount, OrderId, OrderStatus, ShopId, patch};

use super::Validator;
use crate::error::FieldError;

/// A customer order placed with a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    /// Weak reference; the shop may no longer exist.
    pub shop_id: Option<ShopId>,
    pub amount: Amount,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
}

/// Fields for creating an order. `status` defaults to pending, `date` to now.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    pub amount: Amount,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewOrder {
    /// # Errors
    ///
    /// Returns field errors for a blank order number or customer name.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .required("orderNumber", &self.order_number)
            .required("customerName", &self.customer_name)
            .finish()
    }
}

/// Partial update of an order, typically a status change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub customer_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub shop_id: Option<Option<ShopId>>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.order_number.is_none()
            && self.customer_name.is_none()
            && self.customer_email.is_none()
            && self.shop_id.is_none()
            && self.amount.is_none()
            && self.status.is_none()
            && self.date.is_none()
    }

    /// # Errors
    ///
    /// Returns field errors for a blank order number or customer name.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .required_if_present("orderNumber", self.order_number.as_deref())
            .required_if_present("customerName", self.customer_name.as_deref())
            .finish()
    }

    pub fn apply_to(self, order: &mut Order) {
        if let Some(order_number) = self.order_number {
            order.order_number = order_number;
        }
        if let Some(customer_name) = self.customer_name {
            order.customer_name = customer_name;
        }
        if let Some(customer_email) = self.customer_email {
            order.customer_email = customer_email;
        }
        if let Some(shop_id) = self.shop_id {
            order.shop_id = shop_id;
        }
        if let Some(amount) = self.amount {
            order.amount = amount;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(date) = self.date {
            order.date = date;
        }
    }
}
