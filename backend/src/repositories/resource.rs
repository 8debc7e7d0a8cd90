use sqlx::PgPool;

use crate::models::resource::{CreateResource, KindTotal, Resource, UpdateResource};
use crate::types::{PhaseId, ProjectId, ResourceId};

const RESOURCE_SELECT: &str = r#"
    SELECT r.id, r.project_id, p.name AS project_name, r.phase_id, ph.name AS phase_name,
           r.name, r.kind, r.quantity, r.unit, r.unit_cost,
           r.quantity * r.unit_cost AS total_cost, r.status, r.created_at
    FROM resources r
    LEFT JOIN projects p ON p.id = r.project_id
    LEFT JOIN phases ph ON ph.id = r.phase_id
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>(&format!("{RESOURCE_SELECT} ORDER BY r.created_at DESC"))
        .fetch_all(pool)
        .await
}

pub async fn list_by_project(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Vec<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>(&format!(
        "{RESOURCE_SELECT} WHERE r.project_id = $1 ORDER BY r.name"
    ))
    .bind(project)
    .fetch_all(pool)
    .await
}

pub async fn list_by_phase(pool: &PgPool, phase: PhaseId) -> Result<Vec<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>(&format!(
        "{RESOURCE_SELECT} WHERE r.phase_id = $1 ORDER BY r.name"
    ))
    .bind(phase)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: ResourceId) -> Result<Option<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>(&format!("{RESOURCE_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, payload: &CreateResource) -> Result<ResourceId, sqlx::Error> {
    sqlx::query_scalar::<_, ResourceId>(
        r#"
        INSERT INTO resources (project_id, phase_id, name, kind, quantity, unit, unit_cost, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(payload.project_id)
    .bind(payload.phase_id)
    .bind(payload.name.trim())
    .bind(payload.kind)
    .bind(payload.quantity)
    .bind(&payload.unit)
    .bind(payload.unit_cost)
    .bind(payload.status)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: ResourceId,
    changes: &UpdateResource,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE resources SET
            phase_id = COALESCE($2, phase_id),
            name = COALESCE($3, name),
            kind = COALESCE($4, kind),
            quantity = COALESCE($5, quantity),
            unit = COALESCE($6, unit),
            unit_cost = COALESCE($7, unit_cost),
            status = COALESCE($8, status),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.phase_id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(changes.kind)
    .bind(changes.quantity)
    .bind(&changes.unit)
    .bind(changes.unit_cost)
    .bind(changes.status)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: ResourceId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn totals_by_kind(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Vec<KindTotal>, sqlx::Error> {
    sqlx::query_as::<_, KindTotal>(
        r#"
        SELECT kind,
               COUNT(*) AS count,
               COALESCE(SUM(quantity), 0)::DOUBLE PRECISION AS total_quantity,
               COALESCE(SUM(quantity * unit_cost), 0)::DOUBLE PRECISION AS total_cost
        FROM resources
        WHERE project_id = $1
        GROUP BY kind
        ORDER BY kind
        "#,
    )
    .bind(project)
    .fetch_all(pool)
    .await
}
