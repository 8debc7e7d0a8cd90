use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    handlers::{found, success, touched},
    models::{
        milestone::{CreateMilestone, Milestone},
        phase::{Phase, UpdatePhase},
    },
    repositories::{milestone as milestone_repo, phase as phase_repo},
    state::AppState,
    types::PhaseId,
    validation::{reject, rules::validate_date_range, validated},
};

pub(crate) const PHASE_NOT_FOUND: &str = "Fase no encontrada";

pub async fn get_phase(
    State(state): State<AppState>,
    Path(id): Path<PhaseId>,
) -> AppResult<Json<Phase>> {
    let phase = found(phase_repo::find_by_id(&state.pool, id).await?, PHASE_NOT_FOUND)?;
    Ok(Json(phase))
}

pub async fn update_phase(
    State(state): State<AppState>,
    Path(id): Path<PhaseId>,
    Json(payload): Json<UpdatePhase>,
) -> AppResult<Json<Phase>> {
    let payload = validated(payload)?;
    let current = found(phase_repo::find_by_id(&state.pool, id).await?, PHASE_NOT_FOUND)?;
    validate_date_range(
        payload.start_date.or(current.start_date),
        payload.end_date.or(current.end_date),
    )
    .map_err(|e| reject("end_date", e))?;

    let phase = found(
        phase_repo::update(&state.pool, id, &payload).await?,
        PHASE_NOT_FOUND,
    )?;
    Ok(Json(phase))
}

pub async fn delete_phase(
    State(state): State<AppState>,
    Path(id): Path<PhaseId>,
) -> AppResult<Json<Value>> {
    touched(phase_repo::delete(&state.pool, id).await?, PHASE_NOT_FOUND)?;
    Ok(success("Fase eliminada correctamente"))
}

pub async fn list_phase_milestones(
    State(state): State<AppState>,
    Path(id): Path<PhaseId>,
) -> AppResult<Json<Vec<Milestone>>> {
    found(phase_repo::find_by_id(&state.pool, id).await?, PHASE_NOT_FOUND)?;
    Ok(Json(milestone_repo::list_by_phase(&state.pool, id).await?))
}

pub async fn create_phase_milestone(
    State(state): State<AppState>,
    Path(id): Path<PhaseId>,
    Json(payload): Json<CreateMilestone>,
) -> AppResult<(StatusCode, Json<Milestone>)> {
    let payload = validated(payload)?;
    found(phase_repo::find_by_id(&state.pool, id).await?, PHASE_NOT_FOUND)?;

    let milestone_id = milestone_repo::create(&state.pool, id, &payload).await?;
    let milestone = found(
        milestone_repo::find_by_id(&state.pool, milestone_id).await?,
        "Hito no encontrado",
    )?;
    Ok((StatusCode::CREATED, Json(milestone)))
}
