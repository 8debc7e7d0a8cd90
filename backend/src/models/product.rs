use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::ActiveStatus;
use crate::types::{ProductId, ProviderId};
use crate::validation::rules::validate_not_blank;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub category: Option<String>,
    pub unit: String,
    pub current_stock: f64,
    pub minimum_stock: f64,
    pub unit_cost: f64,
    pub provider_id: Option<ProviderId>,
    pub provider_name: Option<String>,
    pub status: ActiveStatus,
    pub organic: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(
        length(min = 2, max = 150, message = "El nombre debe tener al menos 2 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub kind: String,
    pub category: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub unit: String,
    #[validate(range(min = 0.0, message = "El stock no puede ser negativo"))]
    #[serde(default)]
    pub current_stock: f64,
    #[validate(range(min = 0.0, message = "El stock mínimo no puede ser negativo"))]
    #[serde(default)]
    pub minimum_stock: f64,
    #[validate(range(min = 0.0, message = "El costo unitario no puede ser negativo"))]
    #[serde(default)]
    pub unit_cost: f64,
    pub provider_id: Option<ProviderId>,
    #[serde(default)]
    pub organic: bool,
}

/// Stock only changes through inventory movements.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(
        length(min = 2, max = 150, message = "El nombre debe tener al menos 2 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[validate(range(min = 0.0, message = "El stock mínimo no puede ser negativo"))]
    pub minimum_stock: Option<f64>,
    #[validate(range(min = 0.0, message = "El costo unitario no puede ser negativo"))]
    pub unit_cost: Option<f64>,
    pub provider_id: Option<ProviderId>,
    pub status: Option<ActiveStatus>,
    pub organic: Option<bool>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryValue {
    pub product_count: i64,
    pub total_units: f64,
    pub total_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_at_minimum_counts_as_low() {
        let product = Product {
            id: ProductId(1),
            name: "Urea".into(),
            description: None,
            kind: "fertilizante".into(),
            category: None,
            unit: "kg".into(),
            current_stock: 5.0,
            minimum_stock: 5.0,
            unit_cost: 2.5,
            provider_id: None,
            provider_name: None,
            status: ActiveStatus::Active,
            organic: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
    }
}
