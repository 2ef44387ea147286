mod common;

use bazaar_core::domain::Role;
use bazaar_core::services::reconciliation;
use common::*;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::types::BigDecimal;
use uuid::Uuid;

async fn deposit(app: &TestApp, user: Uuid, amount: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(app.url("/wallet/deposit"))
        .bearer_auth(app.token(user, Role::Customer))
        .json(&json!({ "amount": amount }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_deposit_credits_balance_and_ledger() {
    let app = spawn_app().await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;

    let response = deposit(&app, customer, "250").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(as_decimal(&body["balance"]), BigDecimal::from(250));

    let response = reqwest::Client::new()
        .get(app.url("/wallet/balance"))
        .bearer_auth(app.token(customer, Role::Customer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(as_decimal(&body["balance"]), BigDecimal::from(250));

    let entries = ledger_entries(&app.pool, customer).await;
    assert_eq!(entries.len(), 1);
    let (amount, kind, balance_after) = &entries[0];
    assert_eq!(amount, &BigDecimal::from(250));
    assert_eq!(kind, "deposit");
    assert_eq!(balance_after, &BigDecimal::from(250));
}

#[tokio::test]
async fn test_deposit_must_be_positive() {
    let app = spawn_app().await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;

    let response = deposit(&app, customer, "-5").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = deposit(&app, customer, "0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(user_balance(&app.pool, customer).await, BigDecimal::from(0));
    assert!(ledger_entries(&app.pool, customer).await.is_empty());
}

#[tokio::test]
async fn test_transactions_paginated_newest_first() {
    let app = spawn_app().await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;

    for amount in ["100", "200", "300"] {
        let response = deposit(&app, customer, amount).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = reqwest::Client::new()
        .get(app.url("/wallet/transactions?page=1&page_size=2"))
        .bearer_auth(app.token(customer, Role::Customer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(as_decimal(&items[0]["amount"]), BigDecimal::from(300));
    assert_eq!(as_decimal(&items[1]["amount"]), BigDecimal::from(200));
}

#[tokio::test]
async fn test_balances_match_ledger_after_full_order_cycle() {
    let app = spawn_app().await;
    let seller = create_user(&app.pool, Role::Seller, 0).await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;
    let product = create_product(&app.pool, seller, 100, 5).await;

    // Fund through the API so the customer's ledger covers the balance
    let response = deposit(&app, customer, "1000").await;
    assert_eq!(response.status(), StatusCode::OK);

    // 100*2 + 500 standard delivery, paid from the wallet
    let order = place_order(&app, customer, &[(product, 2)], "wallet").await;
    let order_id = order["id"].as_str().unwrap();

    // Seller delivers and is paid out
    let response = reqwest::Client::new()
        .put(app.url(&format!("/orders/{}/status", order_id)))
        .bearer_auth(app.token(seller, Role::Seller))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(user_balance(&app.pool, customer).await, BigDecimal::from(300));
    assert_eq!(user_balance(&app.pool, seller).await, BigDecimal::from(200));

    // Every balance is justified by its ledger
    let drifted = reconciliation::run_once(&app.pool).await.unwrap();
    assert_eq!(drifted, 0);
}

#[tokio::test]
async fn test_reconciliation_reports_drifted_balance() {
    let app = spawn_app().await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;

    let response = deposit(&app, customer, "500").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(reconciliation::run_once(&app.pool).await.unwrap(), 0);

    // Corrupt the cached balance behind the ledger's back
    sqlx::query("UPDATE users SET balance = balance + 50 WHERE id = $1")
        .bind(customer)
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(reconciliation::run_once(&app.pool).await.unwrap(), 1);
}
