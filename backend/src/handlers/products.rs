use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    handlers::{found, providers::PROVIDER_NOT_FOUND, success, touched},
    models::product::{CreateProduct, InventoryValue, Product, UpdateProduct},
    repositories::{product as product_repo, provider as provider_repo},
    state::AppState,
    types::{ProductId, ProviderId},
    validation::validated,
};

pub(crate) const PRODUCT_NOT_FOUND: &str = "Producto no encontrado";

async fn ensure_provider(state: &AppState, provider: Option<ProviderId>) -> AppResult<()> {
    if let Some(id) = provider {
        found(
            provider_repo::find_by_id(&state.pool, id).await?,
            PROVIDER_NOT_FOUND,
        )?;
    }
    Ok(())
}

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_repo::list(&state.pool).await?))
}

pub async fn list_available_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_repo::list_available(&state.pool).await?))
}

pub async fn list_organic_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_repo::list_organic(&state.pool).await?))
}

pub async fn list_low_stock_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_repo::list_low_stock(&state.pool).await?))
}

pub async fn inventory_total_value(
    State(state): State<AppState>,
) -> AppResult<Json<InventoryValue>> {
    Ok(Json(product_repo::inventory_value(&state.pool).await?))
}

pub async fn list_products_by_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product_repo::list_by_kind(&state.pool, &kind).await?))
}

pub async fn list_provider_products(
    State(state): State<AppState>,
    Path(provider): Path<ProviderId>,
) -> AppResult<Json<Vec<Product>>> {
    ensure_provider(&state, Some(provider)).await?;
    Ok(Json(
        product_repo::list_by_provider(&state.pool, provider).await?,
    ))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> AppResult<Json<Product>> {
    Ok(Json(found(
        product_repo::find_by_id(&state.pool, id).await?,
        PRODUCT_NOT_FOUND,
    )?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let payload = validated(payload)?;
    ensure_provider(&state, payload.provider_id).await?;

    let id = product_repo::create(&state.pool, &payload).await?;
    let product = found(
        product_repo::find_by_id(&state.pool, id).await?,
        PRODUCT_NOT_FOUND,
    )?;
    tracing::info!(product_id = %id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<UpdateProduct>,
) -> AppResult<Json<Product>> {
    let payload = validated(payload)?;
    ensure_provider(&state, payload.provider_id).await?;

    touched(
        product_repo::update(&state.pool, id, &payload).await?,
        PRODUCT_NOT_FOUND,
    )?;
    let product = found(
        product_repo::find_by_id(&state.pool, id).await?,
        PRODUCT_NOT_FOUND,
    )?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> AppResult<Json<Value>> {
    touched(product_repo::delete(&state.pool, id).await?, PRODUCT_NOT_FOUND)?;
    Ok(success("Producto eliminado correctamente"))
}
