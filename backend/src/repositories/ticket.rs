use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::project::StatusCount;
use crate::models::ticket::{
    CreateTicket, Ticket, TicketQuery, TicketStats, TicketStatus, UpdateTicket,
};
use crate::types::{TicketId, UserId};

use super::common::push_clause;

const TICKET_SELECT: &str = r#"
    SELECT t.id, t.subject, t.description, t.priority, t.status, t.creator_id,
           c.name AS creator_name, t.assignee_id, a.name AS assignee_name,
           t.project_id, p.name AS project_name, t.closed_at, t.created_at, t.updated_at
    FROM tickets t
    LEFT JOIN users c ON c.id = t.creator_id
    LEFT JOIN users a ON a.id = t.assignee_id
    LEFT JOIN projects p ON p.id = t.project_id
"#;

/// `creator` restricts the listing to one user's tickets.
pub async fn list(
    pool: &PgPool,
    query: &TicketQuery,
    creator: Option<UserId>,
) -> Result<Vec<Ticket>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(TICKET_SELECT);
    let mut has_clause = false;

    if let Some(creator) = creator {
        push_clause(&mut builder, &mut has_clause);
        builder.push("t.creator_id = ").push_bind(creator);
    }
    if let Some(status) = query.status {
        push_clause(&mut builder, &mut has_clause);
        builder.push("t.status = ").push_bind(status);
    }
    if let Some(priority) = query.priority {
        push_clause(&mut builder, &mut has_clause);
        builder.push("t.priority = ").push_bind(priority);
    }

    builder.push(" ORDER BY t.created_at DESC, t.id DESC");
    builder.build_query_as::<Ticket>().fetch_all(pool).await
}

pub async fn find_by_id(pool: &PgPool, id: TicketId) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(&format!("{TICKET_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    payload: &CreateTicket,
    creator: UserId,
) -> Result<TicketId, sqlx::Error> {
    sqlx::query_scalar::<_, TicketId>(
        r#"
        INSERT INTO tickets (subject, description, priority, creator_id, project_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(payload.subject.trim())
    .bind(payload.description.trim())
    .bind(payload.priority)
    .bind(creator)
    .bind(payload.project_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: TicketId,
    changes: &UpdateTicket,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tickets SET
            subject = COALESCE($2, subject),
            description = COALESCE($3, description),
            priority = COALESCE($4, priority),
            project_id = COALESCE($5, project_id),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.subject.as_deref().map(str::trim))
    .bind(changes.description.as_deref().map(str::trim))
    .bind(changes.priority)
    .bind(changes.project_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Stamps `closed_at` on resolve/close and clears it when the ticket reopens.
pub async fn set_status(
    pool: &PgPool,
    id: TicketId,
    status: TicketStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tickets SET
            status = $2,
            closed_at = CASE
                WHEN $3 THEN COALESCE(closed_at, NOW())
                ELSE NULL
            END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(status.closes())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn assign(pool: &PgPool, id: TicketId, assignee: UserId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tickets SET
            assignee_id = $2,
            status = CASE WHEN status = 'open' THEN 'in_progress' ELSE status END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(assignee)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: TicketId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn stats(pool: &PgPool) -> Result<TicketStats, sqlx::Error> {
    sqlx::query_as::<_, TicketStats>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE status = 'open') AS open,
               COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
               COUNT(*) FILTER (WHERE status = 'resolved') AS resolved,
               COUNT(*) FILTER (WHERE status = 'closed') AS closed,
               COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
               COUNT(*) FILTER (WHERE priority = 'urgent' AND status IN ('open', 'in_progress')) AS urgent_open
        FROM tickets
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS total FROM tickets GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
}
