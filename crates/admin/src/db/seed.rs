//! Sample data for development databases.
//!
//! Runs through [`Storage`] so the in-memory backend at startup and `km-cli
//! seed` against `PostgreSQL` produce the same rows. Seeding is idempotent:
//! the admin user is skipped when the username exists, the catalog when any
//! category exists.

use kubra_market_core::{Amount, OrderStatus, PaymentMethod};

use super::{RepositoryError, Storage};
use crate::models::{NewOrder, NewShop, NewShopCategory, NewTransaction, NewUser};

/// Username of the seeded administrator.
pub const ADMIN_USERNAME: &str = "admin";

const GROCERY_IMAGE: &str = "https://images.unsplash.com/photo-1542838132-92c53300491e?ixlib=rb-1.2.1&auto=format&fit=crop&w=600&q=80";
const ORGANIC_IMAGE: &str = "https://images.unsplash.com/photo-1578862973954-ad04ebae8729?ixlib=rb-1.2.1&auto=format&fit=crop&w=600&q=80";

/// What a seeding run actually inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub shop_categories: usize,
    pub shops: usize,
    pub orders: usize,
    pub transactions: usize,
}

/// Insert the sample admin user and catalog.
///
/// `admin_password_hash` must already be a hasher-formatted value.
///
/// # Errors
///
/// Returns the first storage error encountered.
pub async fn seed_sample_data(
    storage: &dyn Storage,
    admin_password_hash: String,
) -> Result<SeedSummary, RepositoryError> {
    let mut summary = SeedSummary::default();

    if storage.get_user_by_username(ADMIN_USERNAME).await?.is_none() {
        storage
            .create_user(NewUser {
                username: ADMIN_USERNAME.to_owned(),
                password_hash: admin_password_hash,
                first_name: Some("Admin".to_owned()),
                last_name: Some("User".to_owned()),
                email: Some("admin@example.com".to_owned()),
                avatar: None,
            })
            .await?;
        summary.users = 1;
    }

    if !storage.list_shop_categories().await?.is_empty() {
        tracing::debug!("Catalog already present, skipping sample catalog");
        return Ok(summary);
    }

    let grocery = storage
        .create_shop_category(NewShopCategory {
            name: "Grocery Stores".to_owned(),
            description: Some("General grocery stores with a wide range of products".to_owned()),
            image: Some(GROCERY_IMAGE.to_owned()),
        })
        .await?;
    let organic = storage
        .create_shop_category(NewShopCategory {
            name: "Organic Markets".to_owned(),
            description: Some("Specialized stores with organic and natural products".to_owned()),
            image: Some(ORGANIC_IMAGE.to_owned()),
        })
        .await?;
    summary.shop_categories = 2;

    let farm_fresh = storage
        .create_shop(NewShop {
            name: "Farm Fresh Groceries".to_owned(),
            description: Some("The freshest produce direct from farms".to_owned()),
            image: Some(ORGANIC_IMAGE.to_owned()),
            address: Some("123 Market St, San Francisco, CA".to_owned()),
            category_id: Some(grocery.id),
        })
        .await?;
    let organic_delights = storage
        .create_shop(NewShop {
            name: "Organic Delights".to_owned(),
            description: Some("100% organic produce and products".to_owned()),
            image: Some(ORGANIC_IMAGE.to_owned()),
            address: Some("456 Organic Ave, Portland, OR".to_owned()),
            category_id: Some(organic.id),
        })
        .await?;
    summary.shops = 2;

    let first_amount = sample_amount("125.00")?;
    let second_amount = sample_amount("89.50")?;

    let first_order = storage
        .create_order(NewOrder {
            order_number: "ORD-2458".to_owned(),
            customer_name: "Sarah Johnson".to_owned(),
            customer_email: Some("sarah@example.com".to_owned()),
            shop_id: Some(farm_fresh.id),
            amount: first_amount,
            status: OrderStatus::Processing,
            date: None,
        })
        .await?;
    let second_order = storage
        .create_order(NewOrder {
            order_number: "ORD-2457".to_owned(),
            customer_name: "Michael Brown".to_owned(),
            customer_email: Some("michael@example.com".to_owned()),
            shop_id: Some(organic_delights.id),
            amount: second_amount,
            status: OrderStatus::Delivered,
            date: None,
        })
        .await?;
    summary.orders = 2;

    storage
        .create_transaction(NewTransaction {
            transaction_id: "TRX-12345".to_owned(),
            order_id: Some(first_order.id),
            amount: first_amount,
            payment_method: PaymentMethod::CreditCard,
            date: None,
        })
        .await?;
    storage
        .create_transaction(NewTransaction {
            transaction_id: "TRX-12346".to_owned(),
            order_id: Some(second_order.id),
            amount: second_amount,
            payment_method: PaymentMethod::Paypal,
            date: None,
        })
        .await?;
    summary.transactions = 2;

    Ok(summary)
}

fn sample_amount(raw: &str) -> Result<Amount, RepositoryError> {
    Amount::parse(raw).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryStorage;

    #[tokio::test]
    async fn test_seed_populates_everything() {
        let storage = InMemoryStorage::new();
        let summary = seed_sample_data(&storage, "aa.bb".to_string())
            .await
            .unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                users: 1,
                shop_categories: 2,
                shops: 2,
                orders: 2,
                transactions: 2,
            }
        );

        let admin = storage
            .get_user_by_username(ADMIN_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.email.as_deref(), Some("admin@example.com"));

        let orders = storage.list_orders().await.unwrap();
        assert_eq!(orders[0].order_number, "ORD-2458");
        assert_eq!(orders[0].amount.to_string(), "125.00");
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let storage = InMemoryStorage::new();
        seed_sample_data(&storage, "aa.bb".to_string())
            .await
            .unwrap();
        let second = seed_sample_data(&storage, "cc.dd".to_string())
            .await
            .unwrap();

        assert_eq!(second, SeedSummary::default());
        assert_eq!(storage.list_shops().await.unwrap().len(), 2);
        let admin = storage
            .get_user_by_username(ADMIN_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.password_hash, "aa.bb");
    }
}
