use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    handlers::{found, success, touched},
    models::{
        milestone::{Milestone, MilestoneStats},
        phase::{CreatePhase, Phase},
        project::{
            Category, CreateProject, Project, ProjectProgress, ProjectSearchQuery, UpdateProject,
        },
    },
    repositories::{
        milestone as milestone_repo, phase as phase_repo, project as project_repo,
    },
    services::session_store::Session,
    state::AppState,
    types::ProjectId,
    validation::{reject, rules::validate_date_range, validated},
};

pub(crate) const PROJECT_NOT_FOUND: &str = "Proyecto no encontrado";

pub(crate) async fn ensure_project(state: &AppState, id: ProjectId) -> AppResult<()> {
    if !project_repo::exists(&state.pool, id).await? {
        return Err(AppError::NotFound(PROJECT_NOT_FOUND.into()));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/projects/categories",
    responses((status = 200, body = [Category])),
    tag = "projects"
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(project_repo::list_categories(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    responses((status = 200, body = [Project])),
    tag = "projects"
)]
pub async fn list_projects(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(project_repo::list(&state.pool).await?))
}

pub async fn my_projects(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(
        project_repo::list_by_owner(&state.pool, session.user_id).await?,
    ))
}

pub async fn search_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectSearchQuery>,
) -> AppResult<Json<Vec<Project>>> {
    if query.q.trim().len() < 2 {
        return Err(AppError::BadRequest(
            "El término de búsqueda debe tener al menos 2 caracteres".into(),
        ));
    }
    Ok(Json(project_repo::search(&state.pool, &query.q).await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = i64, Path)),
    responses((status = 200, body = Project), (status = 404)),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<Project>> {
    let project = found(
        project_repo::find_by_id(&state.pool, id).await?,
        PROJECT_NOT_FOUND,
    )?;
    Ok(Json(project))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProject,
    responses((status = 201, body = Project), (status = 409), (status = 422)),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let payload = validated(payload)?;
    validate_date_range(payload.start_date, payload.end_date)
        .map_err(|e| reject("end_date", e))?;
    if project_repo::name_taken(&state.pool, &payload.name, None).await? {
        return Err(AppError::Conflict(
            "Ya existe un proyecto con ese nombre".into(),
        ));
    }

    let owner = payload.owner_id.unwrap_or(session.user_id);
    let id = project_repo::create(&state.pool, &payload, owner).await?;
    let project = found(
        project_repo::find_by_id(&state.pool, id).await?,
        PROJECT_NOT_FOUND,
    )?;
    tracing::info!(project_id = %id, owner_id = %owner, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = i64, Path)),
    request_body = UpdateProject,
    responses((status = 200, body = Project), (status = 404), (status = 409), (status = 422)),
    tag = "projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Json(payload): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    let payload = validated(payload)?;
    let current = found(
        project_repo::find_by_id(&state.pool, id).await?,
        PROJECT_NOT_FOUND,
    )?;
    validate_date_range(
        payload.start_date.or(current.start_date),
        payload.end_date.or(current.end_date),
    )
    .map_err(|e| reject("end_date", e))?;
    if let Some(name) = payload.name.as_deref() {
        if project_repo::name_taken(&state.pool, name, Some(id)).await? {
            return Err(AppError::Conflict(
                "Ya existe un proyecto con ese nombre".into(),
            ));
        }
    }

    project_repo::update(&state.pool, id, &payload).await?;
    let project = found(
        project_repo::find_by_id(&state.pool, id).await?,
        PROJECT_NOT_FOUND,
    )?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = i64, Path)),
    responses((status = 200, description = "Proyecto eliminado"), (status = 403), (status = 404)),
    tag = "projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<Value>> {
    touched(project_repo::delete(&state.pool, id).await?, PROJECT_NOT_FOUND)?;
    tracing::info!(project_id = %id, "Project deleted");
    Ok(success("Proyecto eliminado correctamente"))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/progress",
    params(("id" = i64, Path)),
    responses((status = 200, body = ProjectProgress), (status = 404)),
    tag = "projects"
)]
pub async fn project_progress(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<ProjectProgress>> {
    ensure_project(&state, id).await?;
    Ok(Json(project_repo::progress(&state.pool, id).await?))
}

pub async fn list_project_phases(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<Vec<Phase>>> {
    ensure_project(&state, id).await?;
    Ok(Json(phase_repo::list_by_project(&state.pool, id).await?))
}

pub async fn create_project_phase(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Json(payload): Json<CreatePhase>,
) -> AppResult<(StatusCode, Json<Phase>)> {
    let payload = validated(payload)?;
    validate_date_range(payload.start_date, payload.end_date)
        .map_err(|e| reject("end_date", e))?;
    ensure_project(&state, id).await?;

    let phase = phase_repo::create(&state.pool, id, &payload).await?;
    Ok((StatusCode::CREATED, Json(phase)))
}

pub async fn list_project_milestones(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<Vec<Milestone>>> {
    ensure_project(&state, id).await?;
    Ok(Json(milestone_repo::list_by_project(&state.pool, id).await?))
}

pub async fn project_milestone_stats(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<MilestoneStats>> {
    ensure_project(&state, id).await?;
    Ok(Json(milestone_repo::stats_for_project(&state.pool, id).await?))
}
