use agrotechnova_backend::models::role::Role;
use axum::http::StatusCode;
use serde_json::json;

mod support;

use support::{app, lazy_state, login_cookie, request, send, session_user};

#[tokio::test]
async fn health_is_public() {
    let app = app(lazy_state());
    let response = send(&app, request("GET", "/api/health", None, None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["status"], "ok");
}

#[tokio::test]
async fn openapi_document_is_public() {
    let app = app(lazy_state());
    let response = send(&app, request("GET", "/api/docs/openapi.json", None, None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json["paths"]["/api/auth/login"].is_object());
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = app(lazy_state());

    for (method, uri) in [
        ("GET", "/api/projects"),
        ("GET", "/api/users"),
        ("GET", "/api/budgets"),
        ("POST", "/api/inventory/exits"),
        ("GET", "/api/admin/sessions"),
        ("GET", "/api/tickets"),
        ("GET", "/api/reports/consolidated"),
    ] {
        let response = send(&app, request(method, uri, None, None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(response.json["error"], "No autenticado");
        assert_eq!(
            response.json["message"],
            "Debe iniciar sesión para acceder a este recurso"
        );
    }
}

#[tokio::test]
async fn unknown_token_is_not_authenticated() {
    let app = app(lazy_state());
    let response = send(
        &app,
        request("GET", "/api/projects", Some("sessionId=deadbeef"), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn producer_is_forbidden_from_admin_and_staff_routes() {
    let state = lazy_state();
    let cookie = login_cookie(&state, &session_user(7, Role::Producer));
    let app = app(state);

    for (method, uri, body) in [
        ("GET", "/api/users", None),
        ("GET", "/api/admin/sessions", None),
        ("GET", "/api/admin/logs", None),
        ("DELETE", "/api/projects/1", None),
        ("PATCH", "/api/tickets/1/assign", Some(json!({ "assignee_id": 2 }))),
        ("POST", "/api/budgets", Some(json!({ "project_id": 1, "total_amount": 10.0 }))),
        ("PATCH", "/api/providers/1/activate", None),
    ] {
        let response = send(&app, request(method, uri, Some(&cookie), body)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(response.json["error"], "Acceso denegado");
        assert_eq!(
            response.json["message"],
            "No tiene permisos para realizar esta acción"
        );
    }
}

#[tokio::test]
async fn advisor_is_staff_but_not_admin() {
    let state = lazy_state();
    let cookie = login_cookie(&state, &session_user(5, Role::Advisor));
    let app = app(state);

    let response = send(&app, request("GET", "/api/admin/sessions", Some(&cookie), None)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Passes the staff gate and fails validation before touching the database.
    let response = send(
        &app,
        request(
            "POST",
            "/api/budgets",
            Some(&cookie),
            Some(json!({ "project_id": 1, "total_amount": 0.0 })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn administrator_sees_session_stats_with_truncated_tokens() {
    let state = lazy_state();
    let cookie = login_cookie(&state, &session_user(42, Role::Administrator));
    let token = cookie.trim_start_matches("sessionId=").to_string();
    let app = app(state);

    let response = send(&app, request("GET", "/api/admin/sessions", Some(&cookie), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["total_sessions"], 1);
    let session = &response.json["sessions"][0];
    assert_eq!(session["user_id"], 42);
    assert_eq!(session["role"], "administrator");
    assert_eq!(session["token_prefix"], format!("{}...", &token[..8]));
    assert!(!response.json.to_string().contains(&token));
}

#[tokio::test]
async fn force_logout_closes_every_session_of_a_user() {
    let state = lazy_state();
    let admin = login_cookie(&state, &session_user(1, Role::Administrator));
    let victim_a = login_cookie(&state, &session_user(9, Role::Producer));
    let victim_b = login_cookie(&state, &session_user(9, Role::Producer));
    let app = app(state);

    let response = send(
        &app,
        request("DELETE", "/api/admin/sessions/user/9", Some(&admin), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["sessions_closed"], 2);

    for cookie in [victim_a, victim_b] {
        let response = send(&app, request("GET", "/api/auth/session", Some(&cookie), None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json["authenticated"], false);
    }
}

#[tokio::test]
async fn session_endpoint_reports_cached_identity() {
    let state = lazy_state();
    let cookie = login_cookie(&state, &session_user(3, Role::Advisor));
    let app = app(state);

    let response = send(&app, request("GET", "/api/auth/session", Some(&cookie), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["authenticated"], true);
    assert_eq!(response.json["user"]["id"], 3);
    assert_eq!(response.json["user"]["role"], "advisor");
}

#[tokio::test]
async fn logout_clears_cookie_and_is_idempotent() {
    let state = lazy_state();
    let cookie = login_cookie(&state, &session_user(4, Role::Producer));
    let app = app(state);

    // The system log write fails against the lazy pool; logout still succeeds.
    let response = send(&app, request("POST", "/api/auth/logout", Some(&cookie), None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["success"], true);
    let set_cookie = response.set_cookie.expect("clearing cookie");
    assert!(set_cookie.starts_with("sessionId=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let response = send(&app, request("GET", "/api/projects", Some(&cookie), None)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(&app, request("POST", "/api/auth/logout", None, None)).await;
    assert_eq!(response.status, StatusCode::OK);
}
