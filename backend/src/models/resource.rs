use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{text_enum, PhaseId, ProjectId, ResourceId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum ResourceKind {
        Material => "material",
        Equipment => "equipment",
        Supply => "supply",
        Labor => "labor",
        Other => "other",
    }
}

text_enum! {
    pub enum ResourceStatus {
        Available => "available",
        InUse => "in_use",
        Depleted => "depleted",
    }
}

impl Default for ResourceStatus {
    fn default() -> Self {
        ResourceStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resource {
    pub id: ResourceId,
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub phase_id: Option<PhaseId>,
    pub phase_name: Option<String>,
    pub name: String,
    pub kind: ResourceKind,
    pub quantity: f64,
    pub unit: Option<String>,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub status: ResourceStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateResource {
    pub project_id: ProjectId,
    pub phase_id: Option<PhaseId>,
    #[validate(
        length(min = 2, max = 150, message = "El nombre debe tener al menos 2 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    pub kind: ResourceKind,
    #[validate(range(min = 0.0, message = "La cantidad no puede ser negativa"))]
    #[serde(default)]
    pub quantity: f64,
    pub unit: Option<String>,
    #[validate(range(min = 0.0, message = "El costo unitario no puede ser negativo"))]
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub status: ResourceStatus,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateResource {
    pub phase_id: Option<PhaseId>,
    #[validate(
        length(min = 2, max = 150, message = "El nombre debe tener al menos 2 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub kind: Option<ResourceKind>,
    #[validate(range(min = 0.0, message = "La cantidad no puede ser negativa"))]
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    #[validate(range(min = 0.0, message = "El costo unitario no puede ser negativo"))]
    pub unit_cost: Option<f64>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KindTotal {
    pub kind: ResourceKind,
    pub count: i64,
    pub total_quantity: f64,
    pub total_cost: f64,
}
