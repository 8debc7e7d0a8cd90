use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{text_enum, ExpenseId, ProjectId, ResourceId, UserId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum ExpenseCategory {
        Resource => "resource",
        Service => "service",
        Transport => "transport",
        Personnel => "personnel",
        General => "general",
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        ExpenseCategory::General
    }
}

text_enum! {
    pub enum ExpenseStatus {
        Registered => "registered",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl Default for ExpenseStatus {
    fn default() -> Self {
        ExpenseStatus::Registered
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: ExpenseId,
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub resource_id: Option<ResourceId>,
    pub resource_name: Option<String>,
    pub description: String,
    pub amount: f64,
    pub spent_on: NaiveDate,
    pub category: ExpenseCategory,
    pub status: ExpenseStatus,
    pub receipt: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpense {
    pub project_id: ProjectId,
    pub resource_id: Option<ResourceId>,
    #[validate(
        length(min = 3, message = "La descripción debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "El monto debe ser mayor a 0"))]
    pub amount: f64,
    pub spent_on: Option<NaiveDate>,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub receipt: Option<String>,
}

/// Amount and project are fixed once the budget has been charged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateExpense {
    #[validate(
        length(min = 3, message = "La descripción debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub description: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub status: Option<ExpenseStatus>,
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub count: i64,
    pub total: f64,
}
