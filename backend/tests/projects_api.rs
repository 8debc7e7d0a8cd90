use agrotechnova_backend::models::role::Role;
use axum::http::StatusCode;
use serde_json::json;

mod support;

use support::{
    app, login_cookie, request, seed_project, seed_user, send, state_with_pool, test_pool,
    unique,
};

#[tokio::test]
async fn project_is_owned_by_creator_and_names_are_unique() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Producer, "active").await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let name = unique("Cafetal");
    let response = send(
        &app,
        request(
            "POST",
            "/api/projects",
            Some(&cookie),
            Some(json!({
                "name": name,
                "start_date": "2025-02-01",
                "end_date": "2025-11-30",
            })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["owner_id"], user.id.0);
    assert_eq!(response.json["status"], "planning");
    let project = response.json["id"].as_i64().expect("project id");

    let response = send(
        &app,
        request("POST", "/api/projects", Some(&cookie), Some(json!({ "name": name }))),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/projects/{}", project),
            Some(&cookie),
            Some(json!({ "end_date": "2025-01-15" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(&app, request("GET", "/api/projects/mine", Some(&cookie), None)).await;
    let mine: Vec<i64> = response
        .json
        .as_array()
        .expect("project list")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert_eq!(mine, vec![project]);

    let response = send(
        &app,
        request("GET", &format!("/api/projects/search?q={}", name), Some(&cookie), None),
    )
    .await;
    assert_eq!(response.json.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn phases_drive_project_progress() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Advisor, "active").await;
    let project = seed_project(&pool, user.id).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);
    let phases_uri = format!("/api/projects/{}/phases", project);

    for (name, progress) in [("Preparación", 100), ("Siembra", 40)] {
        let response = send(
            &app,
            request(
                "POST",
                &phases_uri,
                Some(&cookie),
                Some(json!({ "name": name, "progress": progress })),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json["project_id"], project.0);
    }

    let response = send(
        &app,
        request(
            "POST",
            &phases_uri,
            Some(&cookie),
            Some(json!({ "name": "Cosecha", "progress": 120 })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(
        &app,
        request("GET", &format!("/api/projects/{}/progress", project), Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["total_phases"], 2);
    assert_eq!(response.json["completed_phases"], 1);
    assert_eq!(response.json["average_progress"], 70.0);
}

#[tokio::test]
async fn milestone_completion_stamp_follows_status() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user = seed_user(&pool, Role::Producer, "active").await;
    let project = seed_project(&pool, user.id).await;
    let state = state_with_pool(pool);
    let cookie = login_cookie(&state, &user.session_user());
    let app = app(state);

    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/projects/{}/phases", project),
            Some(&cookie),
            Some(json!({ "name": "Fertilización" })),
        ),
    )
    .await;
    let phase = response.json["id"].as_i64().expect("phase id");

    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/phases/{}/milestones", phase),
            Some(&cookie),
            Some(json!({ "name": "Primera aplicación", "due_date": "2000-03-01" })),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["status"], "pending");
    assert!(response.json["completed_at"].is_null());
    let milestone = format!("/api/milestones/{}", response.json["id"]);

    let response = send(
        &app,
        request(
            "GET",
            &format!("/api/projects/{}/milestone-stats", project),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(response.json["pending"], 1);
    assert_eq!(response.json["overdue"], 1);

    let response = send(
        &app,
        request("PUT", &milestone, Some(&cookie), Some(json!({ "status": "completed" }))),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["status"], "completed");
    assert!(response.json["completed_at"].is_string());

    let response = send(
        &app,
        request(
            "GET",
            &format!("/api/projects/{}/milestone-stats", project),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(response.json["completed"], 1);
    assert_eq!(response.json["overdue"], 0);

    let response = send(
        &app,
        request("PUT", &milestone, Some(&cookie), Some(json!({ "status": "in_progress" }))),
    )
    .await;
    assert_eq!(response.json["status"], "in_progress");
    assert!(response.json["completed_at"].is_null());
}

#[tokio::test]
async fn only_administrators_delete_projects() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let owner = seed_user(&pool, Role::Advisor, "active").await;
    let admin = seed_user(&pool, Role::Administrator, "active").await;
    let project = seed_project(&pool, owner.id).await;
    let state = state_with_pool(pool);
    let owner_cookie = login_cookie(&state, &owner.session_user());
    let admin_cookie = login_cookie(&state, &admin.session_user());
    let app = app(state);
    let uri = format!("/api/projects/{}", project);

    let response = send(&app, request("DELETE", &uri, Some(&owner_cookie), None)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, request("DELETE", &uri, Some(&admin_cookie), None)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, request("GET", &uri, Some(&owner_cookie), None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
