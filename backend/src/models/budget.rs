use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{BudgetId, ProjectId};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Budget {
    pub id: BudgetId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub total_amount: f64,
    pub spent_amount: f64,
    pub available_amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBudget {
    pub project_id: ProjectId,
    #[validate(range(exclusive_min = 0.0, message = "El monto total debe ser mayor a 0"))]
    pub total_amount: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBudget {
    #[validate(range(exclusive_min = 0.0, message = "El monto total debe ser mayor a 0"))]
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub percent_spent: f64,
}

impl From<Budget> for BudgetStatus {
    fn from(budget: Budget) -> Self {
        let percent_spent = percent(budget.spent_amount, budget.total_amount);
        Self {
            budget,
            percent_spent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetCheck {
    pub project_id: ProjectId,
    pub sufficient: bool,
    pub available: f64,
    pub requested: f64,
}

/// Percentage rounded to two decimals; zero when the base is not positive.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    ((part / whole) * 10_000.0).round() / 100.0
}
