use sqlx::PgPool;

use crate::models::phase::{CreatePhase, Phase, UpdatePhase};
use crate::types::{PhaseId, ProjectId};

const PHASE_COLUMNS: &str = "id, project_id, name, description, start_date, end_date, progress, \
                             status, created_at, updated_at";

pub async fn list_by_project(pool: &PgPool, project: ProjectId) -> Result<Vec<Phase>, sqlx::Error> {
    sqlx::query_as::<_, Phase>(&format!(
        "SELECT {PHASE_COLUMNS} FROM phases WHERE project_id = $1 \
         ORDER BY start_date ASC NULLS LAST, id ASC"
    ))
    .bind(project)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: PhaseId) -> Result<Option<Phase>, sqlx::Error> {
    sqlx::query_as::<_, Phase>(&format!("SELECT {PHASE_COLUMNS} FROM phases WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    project: ProjectId,
    payload: &CreatePhase,
) -> Result<Phase, sqlx::Error> {
    sqlx::query_as::<_, Phase>(&format!(
        "INSERT INTO phases (project_id, name, description, start_date, end_date, progress, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PHASE_COLUMNS}"
    ))
    .bind(project)
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.progress)
    .bind(payload.status)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: PhaseId,
    changes: &UpdatePhase,
) -> Result<Option<Phase>, sqlx::Error> {
    sqlx::query_as::<_, Phase>(&format!(
        r#"
        UPDATE phases SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            start_date = COALESCE($4, start_date),
            end_date = COALESCE($5, end_date),
            progress = COALESCE($6, progress),
            status = COALESCE($7, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {PHASE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(&changes.description)
    .bind(changes.start_date)
    .bind(changes.end_date)
    .bind(changes.progress)
    .bind(changes.status)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: PhaseId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM phases WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
