use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{text_enum, PhaseId, ProjectId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum PhaseStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl Default for PhaseStatus {
    fn default() -> Self {
        PhaseStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Phase {
    pub id: PhaseId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: i32,
    pub status: PhaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePhase {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 100, message = "El avance debe estar entre 0 y 100"))]
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub status: PhaseStatus,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePhase {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 100, message = "El avance debe estar entre 0 y 100"))]
    pub progress: Option<i32>,
    pub status: Option<PhaseStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_must_be_a_percentage() {
        let payload: CreatePhase = serde_json::from_value(serde_json::json!({
            "name": "Siembra",
            "progress": 120
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        let payload: UpdatePhase =
            serde_json::from_value(serde_json::json!({ "progress": 100 })).unwrap();
        assert!(payload.validate().is_ok());
    }
}
