use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    handlers::{found, phases::PHASE_NOT_FOUND, projects::ensure_project, success, touched},
    models::task::{
        Assignment, Availability, AvailabilityQuery, CreateAssignment, CreateTask, Task,
        UpdateTask, UpdateWorkedHours,
    },
    repositories::{phase as phase_repo, resource as resource_repo, task as task_repo},
    state::AppState,
    types::{AssignmentId, PhaseId, ProjectId, ResourceId, TaskId},
    validation::{reject, rules::validate_date_range, validated},
};

const TASK_NOT_FOUND: &str = "Tarea no encontrada";
const ASSIGNMENT_NOT_FOUND: &str = "Asignación no encontrada";
const RESOURCE_NOT_FOUND: &str = "Recurso no encontrado";

pub async fn list_tasks(State(state): State<AppState>) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(task_repo::list(&state.pool).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> AppResult<Json<Task>> {
    Ok(Json(found(
        task_repo::find_by_id(&state.pool, id).await?,
        TASK_NOT_FOUND,
    )?))
}

pub async fn list_phase_tasks(
    State(state): State<AppState>,
    Path(id): Path<PhaseId>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(task_repo::list_by_phase(&state.pool, id).await?))
}

pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> AppResult<Json<Vec<Task>>> {
    ensure_project(&state, id).await?;
    Ok(Json(task_repo::list_by_project(&state.pool, id).await?))
}

/// The project is always the phase's project.
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let payload = validated(payload)?;
    validate_date_range(payload.start_date, payload.end_date)
        .map_err(|e| reject("end_date", e))?;
    let phase = found(
        phase_repo::find_by_id(&state.pool, payload.phase_id).await?,
        PHASE_NOT_FOUND,
    )?;

    let id = task_repo::create(&state.pool, phase.project_id, &payload).await?;
    let task = found(task_repo::find_by_id(&state.pool, id).await?, TASK_NOT_FOUND)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(payload): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    let payload = validated(payload)?;
    let current = found(task_repo::find_by_id(&state.pool, id).await?, TASK_NOT_FOUND)?;
    validate_date_range(
        payload.start_date.or(current.start_date),
        payload.end_date.or(current.end_date),
    )
    .map_err(|e| reject("end_date", e))?;

    task_repo::update(&state.pool, id, &payload).await?;
    let task = found(task_repo::find_by_id(&state.pool, id).await?, TASK_NOT_FOUND)?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> AppResult<Json<Value>> {
    touched(task_repo::delete(&state.pool, id).await?, TASK_NOT_FOUND)?;
    Ok(success("Tarea eliminada correctamente"))
}

pub async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> AppResult<Json<Vec<Assignment>>> {
    found(task_repo::find_by_id(&state.pool, id).await?, TASK_NOT_FOUND)?;
    Ok(Json(task_repo::list_assignments(&state.pool, id).await?))
}

/// A resource can be assigned to a task only once.
pub async fn create_assignment(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(payload): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    let payload = validated(payload)?;
    found(task_repo::find_by_id(&state.pool, id).await?, TASK_NOT_FOUND)?;
    found(
        resource_repo::find_by_id(&state.pool, payload.resource_id).await?,
        RESOURCE_NOT_FOUND,
    )?;

    let assignment = task_repo::create_assignment(&state.pool, id, &payload)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => {
                AppError::Conflict("El recurso ya está asignado a esta tarea".into())
            }
            other => other,
        })?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn update_worked_hours(
    State(state): State<AppState>,
    Path(id): Path<AssignmentId>,
    Json(payload): Json<UpdateWorkedHours>,
) -> AppResult<Json<Value>> {
    let payload = validated(payload)?;
    touched(
        task_repo::update_worked_hours(&state.pool, id, payload.worked_hours).await?,
        ASSIGNMENT_NOT_FOUND,
    )?;
    Ok(success("Horas trabajadas actualizadas"))
}

pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<AssignmentId>,
) -> AppResult<Json<Value>> {
    touched(
        task_repo::delete_assignment(&state.pool, id).await?,
        ASSIGNMENT_NOT_FOUND,
    )?;
    Ok(success("Asignación eliminada correctamente"))
}

pub async fn resource_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<ResourceId>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    if query.to < query.from {
        return Err(AppError::BadRequest(
            "La fecha final debe ser posterior a la inicial".into(),
        ));
    }
    found(
        resource_repo::find_by_id(&state.pool, resource_id).await?,
        RESOURCE_NOT_FOUND,
    )?;

    let conflicts =
        task_repo::count_conflicts(&state.pool, resource_id, query.from, query.to).await?;
    Ok(Json(Availability {
        resource_id,
        available: conflicts == 0,
        conflicts,
    }))
}
