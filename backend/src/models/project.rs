use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::{text_enum, CategoryId, ProjectId, UserId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum ProjectStatus {
        Planning => "planning",
        InProgress => "in_progress",
        Finished => "finished",
        Cancelled => "cancelled",
        Suspended => "suspended",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub owner_id: Option<UserId>,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProject {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub category_id: Option<CategoryId>,
    /// Defaults to the caller.
    pub owner_id: Option<UserId>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProject {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub category_id: Option<CategoryId>,
    pub owner_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProjectProgress {
    pub project_id: ProjectId,
    pub total_phases: i64,
    pub completed_phases: i64,
    pub average_progress: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub total: i64,
}
