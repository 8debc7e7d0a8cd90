use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    handlers::{found, success, touched},
    models::milestone::{Milestone, UpdateMilestone},
    repositories::milestone as milestone_repo,
    services::session_store::Session,
    state::AppState,
    types::MilestoneId,
    validation::validated,
};

const MILESTONE_NOT_FOUND: &str = "Hito no encontrado";

pub async fn my_milestones(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<Milestone>>> {
    Ok(Json(
        milestone_repo::list_by_owner(&state.pool, session.user_id).await?,
    ))
}

pub async fn get_milestone(
    State(state): State<AppState>,
    Path(id): Path<MilestoneId>,
) -> AppResult<Json<Milestone>> {
    let milestone = found(
        milestone_repo::find_by_id(&state.pool, id).await?,
        MILESTONE_NOT_FOUND,
    )?;
    Ok(Json(milestone))
}

pub async fn update_milestone(
    State(state): State<AppState>,
    Path(id): Path<MilestoneId>,
    Json(payload): Json<UpdateMilestone>,
) -> AppResult<Json<Milestone>> {
    let payload = validated(payload)?;
    touched(
        milestone_repo::update(&state.pool, id, &payload).await?,
        MILESTONE_NOT_FOUND,
    )?;
    let milestone = found(
        milestone_repo::find_by_id(&state.pool, id).await?,
        MILESTONE_NOT_FOUND,
    )?;
    Ok(Json(milestone))
}

pub async fn delete_milestone(
    State(state): State<AppState>,
    Path(id): Path<MilestoneId>,
) -> AppResult<Json<Value>> {
    touched(
        milestone_repo::delete(&state.pool, id).await?,
        MILESTONE_NOT_FOUND,
    )?;
    Ok(success("Hito eliminado correctamente"))
}
