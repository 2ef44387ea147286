mod common;

use bazaar_core::domain::Role;
use common::*;
use reqwest::StatusCode;
use uuid::Uuid;

async fn get_json(
    app: &TestApp,
    path: &str,
    actor: Uuid,
    role: Role,
) -> (StatusCode, serde_json::Value) {
    let response = reqwest::Client::new()
        .get(app.url(path))
        .bearer_auth(app.token(actor, role))
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_my_orders_paginated_newest_first() {
    let app = spawn_app().await;
    let seller = create_user(&app.pool, Role::Seller, 0).await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;
    let product = create_product(&app.pool, seller, 100, 50).await;

    let mut order_ids = Vec::new();
    for _ in 0..3 {
        let order = place_order(&app, customer, &[(product, 1)], "card").await;
        order_ids.push(order["id"].as_str().unwrap().to_string());
    }

    let (status, body) = get_json(
        &app,
        "/orders?page=1&page_size=2",
        customer,
        Role::Customer,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 2);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], order_ids[2].as_str());
    assert_eq!(items[1]["id"], order_ids[1].as_str());

    let (_, page2) = get_json(
        &app,
        "/orders?page=2&page_size=2",
        customer,
        Role::Customer,
    )
    .await;
    let items = page2["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], order_ids[0].as_str());
}

#[tokio::test]
async fn test_my_orders_only_shows_own() {
    let app = spawn_app().await;
    let seller = create_user(&app.pool, Role::Seller, 0).await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;
    let other = create_user(&app.pool, Role::Customer, 0).await;
    let product = create_product(&app.pool, seller, 100, 50).await;

    place_order(&app, customer, &[(product, 1)], "card").await;

    let (status, body) = get_json(&app, "/orders", other, Role::Customer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_orders_filters() {
    let app = spawn_app().await;
    let admin = create_user(&app.pool, Role::Admin, 0).await;
    let seller1 = create_user(&app.pool, Role::Seller, 0).await;
    let seller2 = create_user(&app.pool, Role::Seller, 0).await;
    let customer1 = create_user(&app.pool, Role::Customer, 0).await;
    let customer2 = create_user(&app.pool, Role::Customer, 0).await;
    let product1 = create_product(&app.pool, seller1, 100, 50).await;
    let product2 = create_product(&app.pool, seller2, 200, 50).await;

    let order1 = place_order(&app, customer1, &[(product1, 1)], "card").await;
    place_order(&app, customer2, &[(product2, 1)], "card").await;

    let (status, body) = get_json(&app, "/admin/orders", admin, Role::Admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = get_json(
        &app,
        &format!("/admin/orders?user_id={}", customer1),
        admin,
        Role::Admin,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], order1["id"]);

    let (_, body) = get_json(
        &app,
        &format!("/admin/orders?seller_id={}", seller2),
        admin,
        Role::Admin,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["items"][0]["seller_id"], seller2.to_string());

    // Cancel one order and filter by status
    let order1_id = order1["id"].as_str().unwrap();
    let response = reqwest::Client::new()
        .post(app.url(&format!("/orders/{}/cancel", order1_id)))
        .bearer_auth(app.token(customer1, Role::Customer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = get_json(&app, "/admin/orders?status=cancelled", admin, Role::Admin).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], order1_id);

    let (_, body) = get_json(&app, "/admin/orders?status=pending", admin, Role::Admin).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_admin_orders_requires_admin() {
    let app = spawn_app().await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;

    let (status, _) = get_json(&app, "/admin/orders", customer, Role::Customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_seller_orders_deduplicated() {
    let app = spawn_app().await;
    let seller = create_user(&app.pool, Role::Seller, 0).await;
    let other_seller = create_user(&app.pool, Role::Seller, 0).await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;
    let product_a = create_product(&app.pool, seller, 100, 50).await;
    let product_b = create_product(&app.pool, seller, 50, 50).await;
    let foreign = create_product(&app.pool, other_seller, 80, 50).await;

    // Two of the seller's lines in one order must yield one listing entry
    let order = place_order(&app, customer, &[(product_a, 1), (product_b, 2)], "card").await;
    place_order(&app, customer, &[(foreign, 1)], "card").await;

    let (status, body) = get_json(&app, "/seller/orders", seller, Role::Seller).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], order["id"]);
    assert_eq!(items[0]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_seller_orders_requires_seller_role() {
    let app = spawn_app().await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;

    let (status, _) = get_json(&app, "/seller/orders", customer, Role::Customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_order_visibility() {
    let app = spawn_app().await;
    let seller = create_user(&app.pool, Role::Seller, 0).await;
    let customer = create_user(&app.pool, Role::Customer, 0).await;
    let stranger = create_user(&app.pool, Role::Customer, 0).await;
    let admin = create_user(&app.pool, Role::Admin, 0).await;
    let product = create_product(&app.pool, seller, 100, 50).await;

    let order = place_order(&app, customer, &[(product, 1)], "card").await;
    let path = format!("/orders/{}", order["id"].as_str().unwrap());

    let (status, _) = get_json(&app, &path, customer, Role::Customer).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&app, &path, seller, Role::Seller).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&app, &path, admin, Role::Admin).await;
    assert_eq!(status, StatusCode::OK);

    // Strangers see the same response as for a missing order
    let (status, _) = get_json(&app, &path, stranger, Role::Customer).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
