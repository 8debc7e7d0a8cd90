use agrotechnova_backend::models::role::Role;
use axum::http::StatusCode;
use serde_json::json;

mod support;

use support::{
    app, login_cookie, request, seed_phase, seed_project, seed_resource, seed_user, send,
    state_with_pool, test_pool,
};

#[tokio::test]
async fn resource_availability_counts_overlapping_open_tasks() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Producer, "active").await;
    let project = seed_project(&pool, user.id).await;
    let phase = seed_phase(&pool, project).await;
    let tractor = seed_resource(&pool, project, "equipment", 1.0, 0.0).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let response = send(
        &app,
        request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            Some(json!({
                "phase_id": phase,
                "name": "Arado del lote norte",
                "start_date": "2025-03-01",
                "end_date": "2025-03-10",
            })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["project_id"], project.0);
    assert_eq!(response.json["status"], "pending");
    let task = response.json["id"].as_i64().expect("task id");

    let assign = || {
        request(
            "POST",
            &format!("/api/tasks/{}/assignments", task),
            Some(&cookie),
            Some(json!({ "resource_id": tractor, "estimated_hours": 16.0 })),
        )
    };
    let response = send(&app, assign()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["worked_hours"], 0.0);
    let assignment = response.json["id"].as_i64().expect("assignment id");

    let response = send(&app, assign()).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json["message"], "El recurso ya está asignado a esta tarea");

    let availability = |from: &str, to: &str| {
        request(
            "GET",
            &format!(
                "/api/tasks/resource-availability/{}?from={}&to={}",
                tractor, from, to
            ),
            Some(&cookie),
            None,
        )
    };

    let response = send(&app, availability("2025-03-05", "2025-03-06")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["available"], false);
    assert_eq!(response.json["conflicts"], 1);

    let response = send(&app, availability("2025-04-01", "2025-04-02")).await;
    assert_eq!(response.json["available"], true);
    assert_eq!(response.json["conflicts"], 0);

    let response = send(&app, availability("2025-03-06", "2025-03-05")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        request(
            "PATCH",
            &format!("/api/tasks/assignments/{}/hours", assignment),
            Some(&cookie),
            Some(json!({ "worked_hours": 12.5 })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(
        &app,
        request("GET", &format!("/api/tasks/{}/assignments", task), Some(&cookie), None),
    )
    .await;
    assert_eq!(response.json[0]["worked_hours"], 12.5);

    // Completed work no longer holds the resource.
    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/tasks/{}", task),
            Some(&cookie),
            Some(json!({ "status": "completed" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, availability("2025-03-05", "2025-03-06")).await;
    assert_eq!(response.json["available"], true);
}

#[tokio::test]
async fn task_dates_are_validated_against_stored_values() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Advisor, "active").await;
    let project = seed_project(&pool, user.id).await;
    let phase = seed_phase(&pool, project).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let response = send(
        &app,
        request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            Some(json!({
                "phase_id": phase,
                "name": "Riego",
                "start_date": "2025-05-10",
                "end_date": "2025-05-01",
            })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(
        &app,
        request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            Some(json!({
                "phase_id": phase,
                "name": "Riego",
                "start_date": "2025-05-01",
                "end_date": "2025-05-10",
            })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let task = response.json["id"].as_i64().expect("task id");

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/tasks/{}", task),
            Some(&cookie),
            Some(json!({ "end_date": "2025-04-30" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(
        &app,
        request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            Some(json!({ "phase_id": 999_999_999, "name": "Huérfana" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resource_cost_is_quantity_times_unit_cost() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Producer, "active").await;
    let project = seed_project(&pool, user.id).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    for (name, kind, quantity, unit_cost) in [
        ("Urea", "supply", 20.0, 3.5),
        ("Cal agrícola", "supply", 10.0, 2.0),
        ("Jornaleros", "labor", 4.0, 25.0),
    ] {
        let response = send(
            &app,
            request(
                "POST",
                "/api/resources",
                Some(&cookie),
                Some(json!({
                    "project_id": project,
                    "name": name,
                    "kind": kind,
                    "quantity": quantity,
                    "unit_cost": unit_cost,
                })),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json["total_cost"], quantity * unit_cost);
    }

    let response = send(
        &app,
        request(
            "GET",
            &format!("/api/resources/stats/{}", project),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let supply = response
        .json
        .as_array()
        .and_then(|kinds| kinds.iter().find(|k| k["kind"] == "supply"))
        .expect("supply totals");
    assert_eq!(supply["count"], 2);
    assert_eq!(supply["total_cost"], 90.0);
}
