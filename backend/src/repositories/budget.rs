use sqlx::{PgConnection, PgPool};

use crate::models::budget::{Budget, CreateBudget, UpdateBudget};
use crate::types::{BudgetId, ProjectId};

const BUDGET_SELECT: &str = r#"
    SELECT b.id, b.project_id, p.name AS project_name, b.total_amount, b.spent_amount,
           b.total_amount - b.spent_amount AS available_amount,
           b.notes, b.created_at, b.updated_at
    FROM budgets b
    INNER JOIN projects p ON p.id = b.project_id
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Budget>, sqlx::Error> {
    sqlx::query_as::<_, Budget>(&format!("{BUDGET_SELECT} ORDER BY p.name"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: BudgetId) -> Result<Option<Budget>, sqlx::Error> {
    sqlx::query_as::<_, Budget>(&format!("{BUDGET_SELECT} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_project(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Option<Budget>, sqlx::Error> {
    sqlx::query_as::<_, Budget>(&format!("{BUDGET_SELECT} WHERE b.project_id = $1"))
        .bind(project)
        .fetch_optional(pool)
        .await
}

/// Row-locks the project's budget for the rest of the transaction.
pub async fn lock_amounts_for_project(
    conn: &mut PgConnection,
    project: ProjectId,
) -> Result<Option<(BudgetId, f64, f64)>, sqlx::Error> {
    sqlx::query_as::<_, (BudgetId, f64, f64)>(
        "SELECT id, total_amount, spent_amount FROM budgets WHERE project_id = $1 FOR UPDATE",
    )
    .bind(project)
    .fetch_optional(conn)
    .await
}

pub async fn lock_amounts(
    conn: &mut PgConnection,
    id: BudgetId,
) -> Result<Option<(f64, f64)>, sqlx::Error> {
    sqlx::query_as::<_, (f64, f64)>(
        "SELECT total_amount, spent_amount FROM budgets WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Positive `delta` charges the budget, negative refunds it. Never drops below zero.
pub async fn adjust_spent(
    conn: &mut PgConnection,
    project: ProjectId,
    delta: f64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE budgets SET spent_amount = GREATEST(spent_amount + $2, 0), updated_at = NOW() \
         WHERE project_id = $1",
    )
    .bind(project)
    .bind(delta)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn create(pool: &PgPool, payload: &CreateBudget) -> Result<BudgetId, sqlx::Error> {
    sqlx::query_scalar::<_, BudgetId>(
        "INSERT INTO budgets (project_id, total_amount, notes) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(payload.project_id)
    .bind(payload.total_amount)
    .bind(&payload.notes)
    .fetch_one(pool)
    .await
}

pub async fn update(
    conn: &mut PgConnection,
    id: BudgetId,
    changes: &UpdateBudget,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE budgets SET
            total_amount = COALESCE($2, total_amount),
            notes = COALESCE($3, notes),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.total_amount)
    .bind(&changes.notes)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: BudgetId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
