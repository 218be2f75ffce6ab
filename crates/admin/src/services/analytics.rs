//! Sales analytics.
//!
//! Pure functions over order and shop snapshots. Sums are exact decimals;
//! the conversion to a JSON number happens only at serialization.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use kubra_market_core::{ShopId, UNKNOWN_SHOP};

use crate::models::{Order, Shop};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors from sales aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A running total exceeded the decimal range.
    #[error("sales total overflowed")]
    Overflow,
}

fn accumulate(total: &mut Decimal, amount: Decimal) -> Result<(), AnalyticsError> {
    *total = total
        .checked_add(amount)
        .ok_or(AnalyticsError::Overflow)?;
    Ok(())
}

/// Sales total for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySales {
    pub year: i32,
    /// English month name.
    pub month: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Sales total for one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSales {
    /// `None` for orders placed without a shop.
    pub shop_id: Option<ShopId>,
    pub shop_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Total order amounts per (year, month) of the order date, oldest first.
///
/// # Errors
///
/// Returns `AnalyticsError::Overflow` if a month's total leaves the decimal range.
pub fn monthly_sales(orders: &[Order]) -> Result<Vec<MonthlySales>, AnalyticsError> {
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for order in orders {
        let key = (order.date.year(), order.date.month0());
        accumulate(buckets.entry(key).or_default(), order.amount.value())?;
    }

    Ok(buckets
        .into_iter()
        .map(|((year, month0), amount)| MonthlySales {
            year,
            month: MONTH_NAMES
                .get(month0 as usize)
                .copied()
                .unwrap_or_default(),
            amount,
        })
        .collect())
}

/// Total order amounts per shop, largest first.
///
/// Ties keep the order in which each shop was first seen. Shops that no
/// longer exist, and orders without a shop, are reported as "Unknown Shop".
///
/// # Errors
///
/// Returns `AnalyticsError::Overflow` if a shop's total leaves the decimal range.
pub fn top_shops(orders: &[Order], shops: &[Shop]) -> Result<Vec<ShopSales>, AnalyticsError> {
    let mut totals: Vec<(Option<ShopId>, Decimal)> = Vec::new();
    let mut index: HashMap<Option<ShopId>, usize> = HashMap::new();
    for order in orders {
        let slot = *index.entry(order.shop_id).or_insert_with(|| {
            totals.push((order.shop_id, Decimal::ZERO));
            totals.len() - 1
        });
        if let Some((_, total)) = totals.get_mut(slot) {
            accumulate(total, order.amount.value())?;
        }
    }

    let names: HashMap<ShopId, &str> = shops.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut result: Vec<ShopSales> = totals
        .into_iter()
        .map(|(shop_id, amount)| ShopSales {
            shop_id,
            shop_name: shop_id
                .and_then(|id| names.get(&id).copied())
                .unwrap_or(UNKNOWN_SHOP)
                .to_owned(),
            amount,
        })
        .collect();

    // sort_by is stable
    result.sort_by(|a, b| b.amount.cmp(&a.amount));
    Ok(result)
}
