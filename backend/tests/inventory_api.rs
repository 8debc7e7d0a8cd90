use agrotechnova_backend::models::role::Role;
use axum::http::StatusCode;
use serde_json::json;

mod support;

use support::{
    app, login_cookie, request, seed_product, seed_user, send, state_with_pool, test_pool,
};

#[tokio::test]
async fn exit_above_stock_is_rejected_and_stock_is_untouched() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Producer, "active").await;
    let product = seed_product(&pool, 5.0, 12.0).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let response = send(
        &app,
        request(
            "POST",
            "/api/inventory/exits",
            Some(&cookie),
            Some(json!({ "product_id": product, "quantity": 8.0 })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["error"], "Stock insuficiente");
    assert_eq!(response.json["details"]["available"], 5.0);
    assert_eq!(response.json["details"]["requested"], 8.0);

    let response = send(
        &app,
        request("GET", &format!("/api/products/{}", product), Some(&cookie), None),
    )
    .await;
    assert_eq!(response.json["current_stock"], 5.0);
}

#[tokio::test]
async fn entry_then_exit_moves_stock_and_records_movements() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Advisor, "active").await;
    let product = seed_product(&pool, 10.0, 4.0).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let response = send(
        &app,
        request(
            "POST",
            "/api/inventory/entries",
            Some(&cookie),
            Some(json!({ "product_id": product, "quantity": 6.0, "unit_cost": 5.0 })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["kind"], "entry");
    assert_eq!(response.json["total_cost"], 30.0);
    assert_eq!(response.json["user_id"], user.id.0);

    let response = send(
        &app,
        request(
            "POST",
            "/api/inventory/exits",
            Some(&cookie),
            Some(json!({ "product_id": product, "quantity": 16.0, "reason": "Aplicación" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["kind"], "exit");
    // Valued at the product's unit cost, which entries leave alone.
    assert_eq!(response.json["unit_cost"], 4.0);

    let response = send(
        &app,
        request("GET", &format!("/api/products/{}", product), Some(&cookie), None),
    )
    .await;
    assert_eq!(response.json["current_stock"], 0.0);

    let response = send(
        &app,
        request(
            "GET",
            &format!("/api/inventory/summary/{}", product),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["total_entries"], 6.0);
    assert_eq!(response.json["total_exits"], 16.0);
    assert_eq!(response.json["movement_count"], 2);
}

#[tokio::test]
async fn movement_for_unknown_product_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Producer, "active").await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let response = send(
        &app,
        request(
            "POST",
            "/api/inventory/exits",
            Some(&cookie),
            Some(json!({ "product_id": 999_999_999, "quantity": 1.0 })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
