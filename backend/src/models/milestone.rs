use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::{text_enum, MilestoneId, PhaseId, ProjectId, UserId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum MilestoneStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Delayed => "delayed",
    }
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        MilestoneStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Milestone {
    pub id: MilestoneId,
    pub phase_id: PhaseId,
    pub phase_name: String,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub owner_id: Option<UserId>,
    pub owner_name: Option<String>,
    pub status: MilestoneStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMilestone {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub status: MilestoneStatus,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMilestone {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub owner_id: Option<UserId>,
    pub status: Option<MilestoneStatus>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MilestoneStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub delayed: i64,
    /// Not completed and past the due date.
    pub overdue: i64,
}
