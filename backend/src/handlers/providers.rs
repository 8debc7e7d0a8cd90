use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    handlers::{found, success, touched},
    models::{
        provider::{CreateProvider, Provider, UpdateProvider},
        status::ActiveStatus,
    },
    repositories::provider as provider_repo,
    state::AppState,
    types::ProviderId,
    validation::validated,
};

pub(crate) const PROVIDER_NOT_FOUND: &str = "Proveedor no encontrado";
const PROVIDER_TAKEN: &str = "Ya existe un proveedor con ese nombre o NIT";

pub async fn list_providers(State(state): State<AppState>) -> AppResult<Json<Vec<Provider>>> {
    Ok(Json(provider_repo::list(&state.pool).await?))
}

pub async fn list_active_providers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Provider>>> {
    Ok(Json(provider_repo::list_active(&state.pool).await?))
}

pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<ProviderId>,
) -> AppResult<Json<Provider>> {
    Ok(Json(found(
        provider_repo::find_by_id(&state.pool, id).await?,
        PROVIDER_NOT_FOUND,
    )?))
}

pub async fn create_provider(
    State(state): State<AppState>,
    Json(payload): Json<CreateProvider>,
) -> AppResult<(StatusCode, Json<Provider>)> {
    let payload = validated(payload)?;
    if provider_repo::identity_taken(
        &state.pool,
        Some(&payload.name),
        Some(&payload.tax_id),
        None,
    )
    .await?
    {
        return Err(AppError::Conflict(PROVIDER_TAKEN.into()));
    }

    let id = provider_repo::create(&state.pool, &payload).await?;
    let provider = found(
        provider_repo::find_by_id(&state.pool, id).await?,
        PROVIDER_NOT_FOUND,
    )?;
    Ok((StatusCode::CREATED, Json(provider)))
}

pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<ProviderId>,
    Json(payload): Json<UpdateProvider>,
) -> AppResult<Json<Provider>> {
    let payload = validated(payload)?;
    found(
        provider_repo::find_by_id(&state.pool, id).await?,
        PROVIDER_NOT_FOUND,
    )?;

    if (payload.name.is_some() || payload.tax_id.is_some())
        && provider_repo::identity_taken(
            &state.pool,
            payload.name.as_deref(),
            payload.tax_id.as_deref(),
            Some(id),
        )
        .await?
    {
        return Err(AppError::Conflict(PROVIDER_TAKEN.into()));
    }

    provider_repo::update(&state.pool, id, &payload).await?;
    let provider = found(
        provider_repo::find_by_id(&state.pool, id).await?,
        PROVIDER_NOT_FOUND,
    )?;
    Ok(Json(provider))
}

pub async fn activate_provider(
    State(state): State<AppState>,
    Path(id): Path<ProviderId>,
) -> AppResult<Json<Value>> {
    touched(
        provider_repo::set_status(&state.pool, id, ActiveStatus::Active).await?,
        PROVIDER_NOT_FOUND,
    )?;
    Ok(success("Proveedor activado"))
}

pub async fn deactivate_provider(
    State(state): State<AppState>,
    Path(id): Path<ProviderId>,
) -> AppResult<Json<Value>> {
    touched(
        provider_repo::set_status(&state.pool, id, ActiveStatus::Inactive).await?,
        PROVIDER_NOT_FOUND,
    )?;
    Ok(success("Proveedor desactivado"))
}

pub async fn delete_provider(
    State(state): State<AppState>,
    Path(id): Path<ProviderId>,
) -> AppResult<Json<Value>> {
    touched(
        provider_repo::delete(&state.pool, id).await?,
        PROVIDER_NOT_FOUND,
    )?;
    Ok(success("Proveedor eliminado correctamente"))
}
