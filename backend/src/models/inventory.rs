use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{text_enum, MovementId, ProductId, ProjectId, UserId};

text_enum! {
    pub enum MovementKind {
        Entry => "entry",
        Exit => "exit",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub project_id: Option<ProjectId>,
    pub project_name: Option<String>,
    pub kind: MovementKind,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub reason: Option<String>,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntry {
    pub product_id: ProductId,
    #[validate(range(exclusive_min = 0.0, message = "La cantidad debe ser mayor a 0"))]
    pub quantity: f64,
    #[validate(range(exclusive_min = 0.0, message = "El costo unitario debe ser mayor a 0"))]
    pub unit_cost: f64,
    pub project_id: Option<ProjectId>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExit {
    pub product_id: ProductId,
    #[validate(range(exclusive_min = 0.0, message = "La cantidad debe ser mayor a 0"))]
    pub quantity: f64,
    pub project_id: Option<ProjectId>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub product_id: Option<ProductId>,
    pub project_id: Option<ProjectId>,
    pub kind: Option<MovementKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl MovementQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductMovementSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: f64,
    pub total_entries: f64,
    pub total_exits: f64,
    pub entry_cost: f64,
    pub exit_cost: f64,
    pub movement_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryStats {
    pub total_movements: i64,
    pub entries: i64,
    pub exits: i64,
    pub entry_value: f64,
    pub exit_value: f64,
    pub low_stock_products: i64,
}
