use sqlx::PgPool;

use crate::models::milestone::{
    CreateMilestone, Milestone, MilestoneStats, MilestoneStatus, UpdateMilestone,
};
use crate::types::{MilestoneId, PhaseId, ProjectId, UserId};

const MILESTONE_SELECT: &str = r#"
    SELECT m.id, m.phase_id, f.name AS phase_name, f.project_id,
           m.name, m.description, m.due_date, m.owner_id, u.name AS owner_name,
           m.status, m.completed_at, m.created_at
    FROM milestones m
    INNER JOIN phases f ON f.id = m.phase_id
    LEFT JOIN users u ON u.id = m.owner_id
"#;

pub async fn list_by_phase(pool: &PgPool, phase: PhaseId) -> Result<Vec<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "{MILESTONE_SELECT} WHERE m.phase_id = $1 ORDER BY m.due_date, m.id"
    ))
    .bind(phase)
    .fetch_all(pool)
    .await
}

pub async fn list_by_project(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Vec<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "{MILESTONE_SELECT} WHERE f.project_id = $1 ORDER BY m.due_date, m.id"
    ))
    .bind(project)
    .fetch_all(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner: UserId) -> Result<Vec<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "{MILESTONE_SELECT} WHERE m.owner_id = $1 ORDER BY m.due_date, m.id"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: MilestoneId) -> Result<Option<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!("{MILESTONE_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    phase: PhaseId,
    payload: &CreateMilestone,
) -> Result<MilestoneId, sqlx::Error> {
    sqlx::query_scalar::<_, MilestoneId>(
        r#"
        INSERT INTO milestones (phase_id, name, description, due_date, owner_id, status, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 = 'completed' THEN NOW() END)
        RETURNING id
        "#,
    )
    .bind(phase)
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.due_date)
    .bind(payload.owner_id)
    .bind(payload.status)
    .fetch_one(pool)
    .await
}

/// `completed_at` follows the status: stamped on entering `completed`,
/// cleared on leaving it.
pub async fn update(
    pool: &PgPool,
    id: MilestoneId,
    changes: &UpdateMilestone,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE milestones SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            due_date = COALESCE($4, due_date),
            owner_id = COALESCE($5, owner_id),
            completed_at = CASE
                WHEN $6::TEXT IS NULL THEN completed_at
                WHEN $6 = 'completed' THEN COALESCE(completed_at, NOW())
                ELSE NULL
            END,
            status = COALESCE($6, status),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(&changes.description)
    .bind(changes.due_date)
    .bind(changes.owner_id)
    .bind(changes.status)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: MilestoneId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn stats_for_project(
    pool: &PgPool,
    project: ProjectId,
) -> Result<MilestoneStats, sqlx::Error> {
    sqlx::query_as::<_, MilestoneStats>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE m.status = $2) AS pending,
               COUNT(*) FILTER (WHERE m.status = $3) AS in_progress,
               COUNT(*) FILTER (WHERE m.status = $4) AS completed,
               COUNT(*) FILTER (WHERE m.status = $5) AS delayed,
               COUNT(*) FILTER (WHERE m.status <> $4 AND m.due_date < CURRENT_DATE) AS overdue
        FROM milestones m
        INNER JOIN phases f ON f.id = m.phase_id
        WHERE f.project_id = $1
        "#,
    )
    .bind(project)
    .bind(MilestoneStatus::Pending)
    .bind(MilestoneStatus::InProgress)
    .bind(MilestoneStatus::Completed)
    .bind(MilestoneStatus::Delayed)
    .fetch_one(pool)
    .await
}
