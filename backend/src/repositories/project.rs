use sqlx::PgPool;

use super::common::contains_pattern;

use crate::models::project::{
    Category, CreateProject, Project, ProjectProgress, StatusCount, UpdateProject,
};
use crate::types::{ProjectId, UserId};

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.start_date, p.end_date, p.status,
           p.category_id, c.name AS category_name,
           p.owner_id, u.name AS owner_name,
           p.created_at, p.updated_at
    FROM projects p
    LEFT JOIN project_categories c ON c.id = p.category_id
    LEFT JOIN users u ON u.id = p.owner_id
"#;

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description FROM project_categories ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "{PROJECT_SELECT} ORDER BY p.created_at DESC, p.id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner: UserId) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "{PROJECT_SELECT} WHERE p.owner_id = $1 ORDER BY p.created_at DESC, p.id DESC"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await
}

pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Project>, sqlx::Error> {
    let pattern = contains_pattern(term);
    sqlx::query_as::<_, Project>(&format!(
        "{PROJECT_SELECT} WHERE p.name ILIKE $1 OR p.description ILIKE $1 \
         ORDER BY p.name LIMIT 100"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: ProjectId) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!("{PROJECT_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: ProjectId) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn name_taken(
    pool: &PgPool,
    name: &str,
    except: Option<ProjectId>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE LOWER(name) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(name.trim())
    .bind(except)
    .fetch_one(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    payload: &CreateProject,
    owner: UserId,
) -> Result<ProjectId, sqlx::Error> {
    sqlx::query_scalar::<_, ProjectId>(
        r#"
        INSERT INTO projects (name, description, start_date, end_date, status, category_id, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.status)
    .bind(payload.category_id)
    .bind(owner)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: ProjectId,
    changes: &UpdateProject,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            start_date = COALESCE($4, start_date),
            end_date = COALESCE($5, end_date),
            status = COALESCE($6, status),
            category_id = COALESCE($7, category_id),
            owner_id = COALESCE($8, owner_id),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(&changes.description)
    .bind(changes.start_date)
    .bind(changes.end_date)
    .bind(changes.status)
    .bind(changes.category_id)
    .bind(changes.owner_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: ProjectId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn progress(pool: &PgPool, id: ProjectId) -> Result<ProjectProgress, sqlx::Error> {
    sqlx::query_as::<_, ProjectProgress>(
        r#"
        SELECT $1::BIGINT AS project_id,
               COUNT(*) AS total_phases,
               COUNT(*) FILTER (WHERE status = 'completed' OR progress = 100) AS completed_phases,
               COALESCE(ROUND(AVG(progress)::NUMERIC, 2), 0)::DOUBLE PRECISION AS average_progress
        FROM phases
        WHERE project_id = $1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS total FROM projects GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
}
