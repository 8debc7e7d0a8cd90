use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::Priority;
use crate::types::{text_enum, ProjectId, TicketId, UserId};
use crate::validation::rules::validate_not_blank;

text_enum! {
    pub enum TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

impl TicketStatus {
    /// Statuses that stamp `closed_at`.
    pub fn closes(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub creator_id: UserId,
    pub creator_name: Option<String>,
    pub assignee_id: Option<UserId>,
    pub assignee_name: Option<String>,
    pub project_id: Option<ProjectId>,
    pub project_name: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicket {
    #[validate(
        length(min = 5, max = 200, message = "El asunto debe tener entre 5 y 200 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub subject: String,
    #[validate(
        length(min = 10, message = "La descripción debe tener al menos 10 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTicket {
    #[validate(
        length(min = 5, max = 200, message = "El asunto debe tener entre 5 y 200 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub subject: Option<String>,
    #[validate(
        length(min = 10, message = "La descripción debe tener al menos 10 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketStatus {
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignTicket {
    pub assignee_id: UserId,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
    pub cancelled: i64,
    pub urgent_open: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resolved_and_closed_stamp_closed_at() {
        let closing: Vec<_> = TicketStatus::ALL
            .iter()
            .filter(|status| status.closes())
            .collect();
        assert_eq!(closing, vec![&TicketStatus::Resolved, &TicketStatus::Closed]);
    }
}
