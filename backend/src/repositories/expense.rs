use sqlx::{PgConnection, PgPool};

use crate::models::expense::{CategoryTotal, CreateExpense, Expense, UpdateExpense};
use crate::types::{ExpenseId, ProjectId, UserId};

const EXPENSE_SELECT: &str = r#"
    SELECT e.id, e.project_id, p.name AS project_name, e.resource_id, r.name AS resource_name,
           e.description, e.amount, e.spent_on, e.category, e.status, e.receipt,
           e.created_by, e.created_at
    FROM expenses e
    LEFT JOIN projects p ON p.id = e.project_id
    LEFT JOIN resources r ON r.id = e.resource_id
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!(
        "{EXPENSE_SELECT} ORDER BY e.spent_on DESC, e.id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_by_project(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!(
        "{EXPENSE_SELECT} WHERE e.project_id = $1 ORDER BY e.spent_on DESC, e.id DESC"
    ))
    .bind(project)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: ExpenseId) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!("{EXPENSE_SELECT} WHERE e.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(
    conn: &mut PgConnection,
    payload: &CreateExpense,
    created_by: UserId,
) -> Result<ExpenseId, sqlx::Error> {
    sqlx::query_scalar::<_, ExpenseId>(
        r#"
        INSERT INTO expenses (project_id, resource_id, description, amount, spent_on, category, receipt, created_by)
        VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE), $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(payload.project_id)
    .bind(payload.resource_id)
    .bind(payload.description.trim())
    .bind(payload.amount)
    .bind(payload.spent_on)
    .bind(payload.category)
    .bind(&payload.receipt)
    .bind(created_by)
    .fetch_one(conn)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: ExpenseId,
    changes: &UpdateExpense,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE expenses SET
            description = COALESCE($2, description),
            category = COALESCE($3, category),
            status = COALESCE($4, status),
            receipt = COALESCE($5, receipt)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.description.as_deref().map(str::trim))
    .bind(changes.category)
    .bind(changes.status)
    .bind(&changes.receipt)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Deletes and returns what the budget must be refunded.
pub async fn delete_returning(
    conn: &mut PgConnection,
    id: ExpenseId,
) -> Result<Option<(ProjectId, f64)>, sqlx::Error> {
    sqlx::query_as::<_, (ProjectId, f64)>(
        "DELETE FROM expenses WHERE id = $1 RETURNING project_id, amount",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn totals_by_category(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Vec<CategoryTotal>, sqlx::Error> {
    sqlx::query_as::<_, CategoryTotal>(
        r#"
        SELECT category, COUNT(*) AS count, COALESCE(SUM(amount), 0)::DOUBLE PRECISION AS total
        FROM expenses
        WHERE project_id = $1
        GROUP BY category
        ORDER BY total DESC
        "#,
    )
    .bind(project)
    .fetch_all(pool)
    .await
}
