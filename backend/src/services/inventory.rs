//! Stock movements. Entries and exits update `current_stock` in the same
//! transaction as the movement row, with the product row locked.

use sqlx::PgPool;
use thiserror::Error;

use crate::error::AppError;
use crate::models::inventory::{CreateEntry, CreateExit, MovementKind};
use crate::repositories::inventory::{self as inventory_repo, NewMovement};
use crate::repositories::product as product_repo;
use crate::types::{MovementId, UserId};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Producto no encontrado")]
    ProductNotFound,
    #[error("Stock insuficiente: disponible {available}, solicitado {requested}")]
    InsufficientStock { available: f64, requested: f64 },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ProductNotFound => AppError::NotFound(err.to_string()),
            InventoryError::InsufficientStock {
                available,
                requested,
            } => AppError::InsufficientStock {
                available,
                requested,
            },
            InventoryError::Database(db) => db.into(),
        }
    }
}

/// Stock left after taking `requested` out.
pub fn stock_after_exit(available: f64, requested: f64) -> Result<f64, InventoryError> {
    if requested > available {
        return Err(InventoryError::InsufficientStock {
            available,
            requested,
        });
    }
    Ok(available - requested)
}

pub async fn register_entry(
    pool: &PgPool,
    payload: &CreateEntry,
    user_id: UserId,
) -> Result<MovementId, InventoryError> {
    let mut tx = pool.begin().await?;

    let (stock, _) = product_repo::lock_stock(&mut *tx, payload.product_id)
        .await?
        .ok_or(InventoryError::ProductNotFound)?;

    let movement = NewMovement {
        product_id: payload.product_id,
        project_id: payload.project_id,
        kind: MovementKind::Entry,
        quantity: payload.quantity,
        unit_cost: payload.unit_cost,
        reason: payload.reason.as_deref(),
        user_id,
    };
    let id = inventory_repo::insert(&mut *tx, &movement).await?;
    product_repo::set_stock(&mut *tx, payload.product_id, stock + payload.quantity).await?;
    tx.commit().await?;

    tracing::info!(
        movement_id = %id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        "Inventory entry registered"
    );
    Ok(id)
}

/// Exits are valued at the product's current unit cost.
pub async fn register_exit(
    pool: &PgPool,
    payload: &CreateExit,
    user_id: UserId,
) -> Result<MovementId, InventoryError> {
    let mut tx = pool.begin().await?;

    let (stock, unit_cost) = product_repo::lock_stock(&mut *tx, payload.product_id)
        .await?
        .ok_or(InventoryError::ProductNotFound)?;
    let remaining = stock_after_exit(stock, payload.quantity)?;

    let movement = NewMovement {
        product_id: payload.product_id,
        project_id: payload.project_id,
        kind: MovementKind::Exit,
        quantity: payload.quantity,
        unit_cost,
        reason: payload.reason.as_deref(),
        user_id,
    };
    let id = inventory_repo::insert(&mut *tx, &movement).await?;
    product_repo::set_stock(&mut *tx, payload.product_id, remaining).await?;
    tx.commit().await?;

    tracing::info!(
        movement_id = %id,
        product_id = %payload.product_id,
        quantity = payload.quantity,
        remaining,
        "Inventory exit registered"
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_cannot_exceed_stock() {
        assert_eq!(stock_after_exit(10.0, 4.0).unwrap(), 6.0);
        assert_eq!(stock_after_exit(10.0, 10.0).unwrap(), 0.0);
        assert!(matches!(
            stock_after_exit(3.0, 5.0),
            Err(InventoryError::InsufficientStock {
                available,
                requested
            }) if available == 3.0 && requested == 5.0
        ));
    }

    #[test]
    fn insufficient_stock_keeps_amounts_in_response_error() {
        let err: AppError = InventoryError::InsufficientStock {
            available: 2.0,
            requested: 7.5,
        }
        .into();
        assert!(matches!(
            err,
            AppError::InsufficientStock { available, requested }
                if available == 2.0 && requested == 7.5
        ));
    }
}
