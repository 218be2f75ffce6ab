//! Orders, transactions and analytics.

#![allow(clippy::unwrap_used)]

use kubra_market_integration_tests::TestContext;
use serde_json::{Value, json};

async fn create_shop(ctx: &TestContext, name: &str) -> Value {
    ctx.post("/api/shops", &json!({ "name": name }))
        .await
        .json()
        .await
        .unwrap()
}

async fn create_order(ctx: &TestContext, shop: &Value, amount: &str, date: &str) -> Value {
    let response = ctx
        .post(
            "/api/orders",
            &json!({
                "orderNumber": format!("ORD-{amount}-{date}"),
                "customerName": "Customer",
                "shopId": shop["id"],
                "amount": amount,
                "date": date,
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_order_lifecycle() {
    let ctx = TestContext::new().await;
    ctx.authenticate().await;
    let shop = create_shop(&ctx, "Farm Fresh").await;

    let order = create_order(&ctx, &shop, "125.00", "2024-03-01T10:00:00Z").await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["amount"], "125.00");

    let response = ctx
        .put(
            &format!("/api/orders/{}", order["id"]),
            &json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["status"], "shipped");
    assert_eq!(updated["orderNumber"], order["orderNumber"]);

    let by_shop: Vec<Value> = ctx
        .get(&format!("/api/orders?shopId={}", shop["id"]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(by_shop.len(), 1);

    let response = ctx.get("/api/orders/4242").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_order_rejects_bad_amount_and_status() {
    let ctx = TestContext::new().await;
    ctx.authenticate().await;

    let response = ctx
        .post(
            "/api/orders",
            &json!({ "orderNumber": "ORD-1", "customerName": "Ada", "amount": "lots" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = ctx
        .post(
            "/api/orders",
            &json!({ "orderNumber": "ORD-1", "customerName": "Ada", "amount": "1.00", "status": "lost" }),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_orders_require_session() {
    let ctx = TestContext::new().await;
    assert_eq!(ctx.get("/api/orders").await.status(), 401);
    assert_eq!(ctx.get("/api/transactions").await.status(), 401);
}

#[tokio::test]
async fn test_transactions() {
    let ctx = TestContext::new().await;
    ctx.authenticate().await;
    let shop = create_shop(&ctx, "Organic Delights").await;
    let order = create_order(&ctx, &shop, "89.50", "2024-05-05T09:30:00Z").await;

    let response = ctx
        .post(
            "/api/transactions",
            &json!({
                "transactionId": "TRX-1",
                "orderId": order["id"],
                "amount": "89.50",
                "paymentMethod": "paypal"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let transaction: Value = response.json().await.unwrap();
    assert_eq!(transaction["paymentMethod"], "paypal");

    let fetched: Value = ctx
        .get(&format!("/api/transactions/{}", transaction["id"]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, transaction);

    let by_order: Vec<Value> = ctx
        .get(&format!("/api/transactions?orderId={}", order["id"]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(by_order.len(), 1);

    let response = ctx
        .post(
            "/api/transactions",
            &json!({ "transactionId": "TRX-2", "amount": "1", "paymentMethod": "barter" }),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_monthly_sales() {
    let ctx = TestContext::new().await;
    ctx.authenticate().await;
    let shop = create_shop(&ctx, "Shop").await;

    create_order(&ctx, &shop, "25.00", "2024-04-10T00:00:00Z").await;
    create_order(&ctx, &shop, "100.00", "2024-03-01T00:00:00Z").await;
    create_order(&ctx, &shop, "50.00", "2024-03-20T00:00:00Z").await;
    create_order(&ctx, &shop, "10.00", "2023-03-20T00:00:00Z").await;

    let sales: Value = ctx.get("/api/analytics/sales").await.json().await.unwrap();
    assert_eq!(
        sales,
        json!([
            { "year": 2023, "month": "March", "amount": 10.0 },
            { "year": 2024, "month": "March", "amount": 150.0 },
            { "year": 2024, "month": "April", "amount": 25.0 },
        ])
    );
}

#[tokio::test]
async fn test_top_shops() {
    let ctx = TestContext::new().await;
    ctx.authenticate().await;

    let a = create_shop(&ctx, "A").await;
    let b = create_shop(&ctx, "B").await;
    let c = create_shop(&ctx, "C").await;
    create_order(&ctx, &a, "300", "2024-01-01T00:00:00Z").await;
    create_order(&ctx, &b, "100", "2024-01-01T00:00:00Z").await;
    create_order(&ctx, &c, "200", "2024-01-01T00:00:00Z").await;

    // Deleting a shop leaves its orders behind under "Unknown Shop".
    ctx.delete(&format!("/api/shops/{}", b["id"])).await;

    let anonymous = TestContext::new_client();
    let top: Vec<Value> = anonymous
        .get(ctx.url("/api/analytics/shops"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = top.iter().map(|s| s["shopName"].as_str().unwrap()).collect();
    assert_eq!(names, ["A", "C", "Unknown Shop"]);
    assert_eq!(top[0]["amount"], json!(300.0));
    assert_eq!(top[2]["shopId"], b["id"]);
}
