use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    handlers::{found, projects::ensure_project, success, touched},
    models::resource::{CreateResource, KindTotal, Resource, UpdateResource},
    repositories::resource as resource_repo,
    state::AppState,
    types::{PhaseId, ProjectId, ResourceId},
    validation::validated,
};

const RESOURCE_NOT_FOUND: &str = "Recurso no encontrado";

pub async fn list_resources(State(state): State<AppState>) -> AppResult<Json<Vec<Resource>>> {
    Ok(Json(resource_repo::list(&state.pool).await?))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> AppResult<Json<Resource>> {
    Ok(Json(found(
        resource_repo::find_by_id(&state.pool, id).await?,
        RESOURCE_NOT_FOUND,
    )?))
}

pub async fn list_project_resources(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<Vec<Resource>>> {
    ensure_project(&state, project_id).await?;
    Ok(Json(
        resource_repo::list_by_project(&state.pool, project_id).await?,
    ))
}

pub async fn list_phase_resources(
    State(state): State<AppState>,
    Path(phase_id): Path<PhaseId>,
) -> AppResult<Json<Vec<Resource>>> {
    Ok(Json(resource_repo::list_by_phase(&state.pool, phase_id).await?))
}

pub async fn resource_stats(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> AppResult<Json<Vec<KindTotal>>> {
    ensure_project(&state, project_id).await?;
    Ok(Json(
        resource_repo::totals_by_kind(&state.pool, project_id).await?,
    ))
}

pub async fn create_resource(
    State(state): State<AppState>,
    Json(payload): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    let payload = validated(payload)?;
    ensure_project(&state, payload.project_id).await?;

    let id = resource_repo::create(&state.pool, &payload).await?;
    let resource = found(
        resource_repo::find_by_id(&state.pool, id).await?,
        RESOURCE_NOT_FOUND,
    )?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    Json(payload): Json<UpdateResource>,
) -> AppResult<Json<Resource>> {
    let payload = validated(payload)?;
    touched(
        resource_repo::update(&state.pool, id, &payload).await?,
        RESOURCE_NOT_FOUND,
    )?;
    let resource = found(
        resource_repo::find_by_id(&state.pool, id).await?,
        RESOURCE_NOT_FOUND,
    )?;
    Ok(Json(resource))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
) -> AppResult<Json<Value>> {
    touched(
        resource_repo::delete(&state.pool, id).await?,
        RESOURCE_NOT_FOUND,
    )?;
    Ok(success("Recurso eliminado correctamente"))
}
