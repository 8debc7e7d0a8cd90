use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::AppResult,
    handlers::{found, products::PRODUCT_NOT_FOUND, projects::ensure_project},
    models::inventory::{
        CreateEntry, CreateExit, InventoryStats, Movement, MovementQuery, ProductMovementSummary,
    },
    repositories::inventory as inventory_repo,
    services::{inventory as inventory_service, session_store::Session},
    state::AppState,
    types::{ProductId, ProjectId},
    validation::validated,
};

const MOVEMENT_NOT_FOUND: &str = "Movimiento no encontrado";

async fn ensure_optional_project(state: &AppState, project: Option<ProjectId>) -> AppResult<()> {
    match project {
        Some(id) => ensure_project(state, id).await,
        None => Ok(()),
    }
}

pub async fn register_entry(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateEntry>,
) -> AppResult<(StatusCode, Json<Movement>)> {
    let payload = validated(payload)?;
    ensure_optional_project(&state, payload.project_id).await?;

    let id = inventory_service::register_entry(&state.pool, &payload, session.user_id).await?;
    let movement = found(
        inventory_repo::find_by_id(&state.pool, id).await?,
        MOVEMENT_NOT_FOUND,
    )?;
    tracing::info!(
        movement_id = %id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        "Inventory entry registered"
    );
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Rejected with 400 and both quantities when stock cannot cover it.
pub async fn register_exit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateExit>,
) -> AppResult<(StatusCode, Json<Movement>)> {
    let payload = validated(payload)?;
    ensure_optional_project(&state, payload.project_id).await?;

    let id = inventory_service::register_exit(&state.pool, &payload, session.user_id).await?;
    let movement = found(
        inventory_repo::find_by_id(&state.pool, id).await?,
        MOVEMENT_NOT_FOUND,
    )?;
    tracing::info!(
        movement_id = %id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        "Inventory exit registered"
    );
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<Movement>>> {
    Ok(Json(inventory_repo::list(&state.pool, &query).await?))
}

pub async fn product_summary(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> AppResult<Json<ProductMovementSummary>> {
    Ok(Json(found(
        inventory_repo::summary_by_product(&state.pool, product_id).await?,
        PRODUCT_NOT_FOUND,
    )?))
}

pub async fn inventory_stats(State(state): State<AppState>) -> AppResult<Json<InventoryStats>> {
    Ok(Json(inventory_repo::stats(&state.pool).await?))
}
