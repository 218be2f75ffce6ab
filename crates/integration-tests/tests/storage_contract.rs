//! Behaviour every storage backend must share.
//!
//! Each check runs against in-memory storage, and against `PostgreSQL` when
//! `TEST_DATABASE_URL` is set and ignored tests are included. Names are made
//! unique so the relational run tolerates rows left by earlier runs.

#![allow(clippy::unwrap_used)]

use kubra_market_admin::db::{InMemoryStorage, RepositoryError, Storage};
use kubra_market_admin::models::{
    NewOrder, NewShop, NewShopCategory, NewTransaction, NewUser, OrderUpdate, ShopCategoryUpdate,
    ShopUpdate, UserUpdate,
};
use kubra_market_core::{Amount, OrderStatus, PaymentMethod, ShopCategoryId, ShopId};
use kubra_market_integration_tests::{postgres_storage, unique};

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: "00.00".to_string(),
        first_name: None,
        last_name: None,
        email: None,
        avatar: None,
    }
}

fn new_category(name: &str) -> NewShopCategory {
    NewShopCategory {
        name: name.to_string(),
        description: Some("desc".to_string()),
        image: None,
    }
}

fn new_shop(name: &str, category_id: Option<ShopCategoryId>) -> NewShop {
    NewShop {
        name: name.to_string(),
        description: None,
        image: None,
        address: None,
        category_id,
    }
}

fn new_order(number: &str, shop_id: Option<ShopId>, amount: &str) -> NewOrder {
    NewOrder {
        order_number: number.to_string(),
        customer_name: "Contract Customer".to_string(),
        customer_email: None,
        shop_id,
        amount: Amount::parse(amount).unwrap(),
        status: OrderStatus::Pending,
        date: None,
    }
}

async fn users_are_unique(storage: &dyn Storage) {
    let name = unique("contract-user");
    let user = storage.create_user(new_user(&name)).await.unwrap();
    assert_eq!(user.username, name);

    let found = storage.get_user_by_username(&name).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    let duplicate = storage.create_user(new_user(&name)).await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    let other = storage
        .create_user(new_user(&unique("contract-other")))
        .await
        .unwrap();
    let rename = UserUpdate {
        username: Some(name.clone()),
        ..Default::default()
    };
    assert!(matches!(
        storage.update_user(other.id, rename).await,
        Err(RepositoryError::Conflict(_))
    ));

    let profile = UserUpdate {
        email: Some(Some("contract@example.com".to_string())),
        ..Default::default()
    };
    let updated = storage.update_user(user.id, profile).await.unwrap().unwrap();
    assert_eq!(updated.email.as_deref(), Some("contract@example.com"));
    assert_eq!(updated.password_hash, user.password_hash);
}

async fn categories_round_trip(storage: &dyn Storage) {
    let category = storage
        .create_shop_category(new_category(&unique("contract-category")))
        .await
        .unwrap();

    let unchanged = storage
        .update_shop_category(category.id, ShopCategoryUpdate::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, category);

    let cleared = storage
        .update_shop_category(
            category.id,
            ShopCategoryUpdate {
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.description.is_none());
    assert_eq!(cleared.name, category.name);

    assert!(storage.delete_shop_category(category.id).await.unwrap());
    assert!(!storage.delete_shop_category(category.id).await.unwrap());
    assert!(
        storage
            .get_shop_category(category.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        storage
            .update_shop_category(category.id, ShopCategoryUpdate::default())
            .await
            .unwrap()
            .is_none()
    );

    let next = storage
        .create_shop_category(new_category(&unique("contract-category")))
        .await
        .unwrap();
    assert!(next.id.as_i32() > category.id.as_i32());
}

async fn shops_keep_dangling_category(storage: &dyn Storage) {
    let category = storage
        .create_shop_category(new_category(&unique("contract-bakery")))
        .await
        .unwrap();
    let shop = storage
        .create_shop(new_shop(&unique("contract-joes"), Some(category.id)))
        .await
        .unwrap();
    storage
        .create_shop(new_shop(&unique("contract-elsewhere"), None))
        .await
        .unwrap();

    let by_category = storage.list_shops_by_category(category.id).await.unwrap();
    assert_eq!(by_category, vec![shop.clone()]);

    assert!(storage.delete_shop_category(category.id).await.unwrap());
    let kept = storage.get_shop(shop.id).await.unwrap().unwrap();
    assert_eq!(kept.category_id, Some(category.id));

    let moved = storage
        .update_shop(
            shop.id,
            ShopUpdate {
                category_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(moved.category_id.is_none());

    assert!(storage.delete_shop(shop.id).await.unwrap());
    assert!(storage.get_shop(shop.id).await.unwrap().is_none());
}

async fn orders_and_transactions(storage: &dyn Storage) {
    let shop = storage
        .create_shop(new_shop(&unique("contract-shop"), None))
        .await
        .unwrap();
    let order = storage
        .create_order(new_order(&unique("ORD"), Some(shop.id), "125.50"))
        .await
        .unwrap();
    assert_eq!(order.amount.to_string(), "125.50");
    assert_eq!(order.status, OrderStatus::Pending);

    let shipped = storage
        .update_order(
            order.id,
            OrderUpdate {
                status: Some(OrderStatus::Shipped),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(shipped.amount, order.amount);

    let by_shop = storage.list_orders_by_shop(shop.id).await.unwrap();
    assert_eq!(by_shop, vec![shipped.clone()]);
    assert!(
        storage
            .list_orders()
            .await
            .unwrap()
            .iter()
            .any(|o| o.id == order.id)
    );

    let transaction = storage
        .create_transaction(NewTransaction {
            transaction_id: unique("TRX"),
            order_id: Some(order.id),
            amount: order.amount,
            payment_method: PaymentMethod::BankTransfer,
            date: None,
        })
        .await
        .unwrap();
    let fetched = storage
        .get_transaction(transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, transaction);

    let by_order = storage.list_transactions_by_order(order.id).await.unwrap();
    assert_eq!(by_order, vec![transaction]);
}

async fn run_contract(storage: &dyn Storage) {
    storage.ping().await.unwrap();
    users_are_unique(storage).await;
    categories_round_trip(storage).await;
    shops_keep_dangling_category(storage).await;
    orders_and_transactions(storage).await;
}

#[tokio::test]
async fn test_memory_storage_contract() {
    let storage = InMemoryStorage::new();
    run_contract(&storage).await;
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_postgres_storage_contract() {
    let Some(storage) = postgres_storage().await else {
        return;
    };
    run_contract(&storage).await;
}
