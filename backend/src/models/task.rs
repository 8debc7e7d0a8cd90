use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::Priority;
use crate::types::{text_enum, AssignmentId, PhaseId, ProjectId, ResourceId, TaskId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: TaskId,
    pub phase_id: PhaseId,
    pub phase_name: Option<String>,
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTask {
    pub phase_id: PhaseId,
    #[validate(
        length(min = 3, max = 100, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(
        length(min = 3, max = 100, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: AssignmentId,
    pub task_id: TaskId,
    pub resource_id: ResourceId,
    pub resource_name: Option<String>,
    pub assigned_on: NaiveDate,
    pub estimated_hours: Option<f64>,
    pub worked_hours: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignment {
    pub resource_id: ResourceId,
    pub assigned_on: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Las horas no pueden ser negativas"))]
    pub estimated_hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkedHours {
    #[validate(range(min = 0.0, message = "Las horas no pueden ser negativas"))]
    pub worked_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct Availability {
    pub resource_id: ResourceId,
    pub available: bool,
    pub conflicts: i64,
}
