use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::task::{Assignment, CreateAssignment, CreateTask, Task, UpdateTask};
use crate::types::{AssignmentId, PhaseId, ProjectId, ResourceId, TaskId};

const TASK_SELECT: &str = r#"
    SELECT t.id, t.phase_id, f.name AS phase_name, t.project_id, p.name AS project_name,
           t.name, t.description, t.start_date, t.end_date, t.status, t.priority, t.created_at
    FROM tasks t
    LEFT JOIN phases f ON f.id = t.phase_id
    LEFT JOIN projects p ON p.id = t.project_id
"#;

// Urgent first, then by start date.
const TASK_ORDER: &str = " ORDER BY CASE t.priority WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 \
                          WHEN 'medium' THEN 2 ELSE 3 END, t.start_date ASC NULLS LAST, t.id";

pub async fn list(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("{TASK_SELECT}{TASK_ORDER}"))
        .fetch_all(pool)
        .await
}

pub async fn list_by_phase(pool: &PgPool, phase: PhaseId) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("{TASK_SELECT} WHERE t.phase_id = $1{TASK_ORDER}"))
        .bind(phase)
        .fetch_all(pool)
        .await
}

pub async fn list_by_project(pool: &PgPool, project: ProjectId) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("{TASK_SELECT} WHERE t.project_id = $1{TASK_ORDER}"))
        .bind(project)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: TaskId) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("{TASK_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    project: ProjectId,
    payload: &CreateTask,
) -> Result<TaskId, sqlx::Error> {
    sqlx::query_scalar::<_, TaskId>(
        r#"
        INSERT INTO tasks (phase_id, project_id, name, description, start_date, end_date, status, priority)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(payload.phase_id)
    .bind(project)
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.status)
    .bind(payload.priority)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: TaskId, changes: &UpdateTask) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tasks SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            start_date = COALESCE($4, start_date),
            end_date = COALESCE($5, end_date),
            status = COALESCE($6, status),
            priority = COALESCE($7, priority)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(&changes.description)
    .bind(changes.start_date)
    .bind(changes.end_date)
    .bind(changes.status)
    .bind(changes.priority)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: TaskId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.task_id, a.resource_id, r.name AS resource_name, a.assigned_on,
           a.estimated_hours, a.worked_hours, a.notes
    FROM task_assignments a
    LEFT JOIN resources r ON r.id = a.resource_id
"#;

pub async fn list_assignments(pool: &PgPool, task: TaskId) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "{ASSIGNMENT_SELECT} WHERE a.task_id = $1 ORDER BY a.assigned_on, a.id"
    ))
    .bind(task)
    .fetch_all(pool)
    .await
}

pub async fn create_assignment(
    pool: &PgPool,
    task: TaskId,
    payload: &CreateAssignment,
) -> Result<Assignment, sqlx::Error> {
    let id = sqlx::query_scalar::<_, AssignmentId>(
        r#"
        INSERT INTO task_assignments (task_id, resource_id, assigned_on, estimated_hours, notes)
        VALUES ($1, $2, COALESCE($3, CURRENT_DATE), $4, $5)
        RETURNING id
        "#,
    )
    .bind(task)
    .bind(payload.resource_id)
    .bind(payload.assigned_on)
    .bind(payload.estimated_hours)
    .bind(&payload.notes)
    .fetch_one(pool)
    .await?;

    sqlx::query_as::<_, Assignment>(&format!("{ASSIGNMENT_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn update_worked_hours(
    pool: &PgPool,
    id: AssignmentId,
    hours: f64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE task_assignments SET worked_hours = $2 WHERE id = $1")
        .bind(id)
        .bind(hours)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_assignment(pool: &PgPool, id: AssignmentId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM task_assignments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Open tasks already holding the resource whose dates overlap `[from, to]`.
pub async fn count_conflicts(
    pool: &PgPool,
    resource: ResourceId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM task_assignments a
        INNER JOIN tasks t ON t.id = a.task_id
        WHERE a.resource_id = $1
          AND t.status IN ('pending', 'in_progress')
          AND t.start_date <= $3
          AND t.end_date >= $2
        "#,
    )
    .bind(resource)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await
}
