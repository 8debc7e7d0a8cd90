use sqlx::PgPool;

use crate::models::report::{ProductUsage, ProjectFinanceRow};
use crate::types::ProjectId;

const FINANCE_SELECT: &str = r#"
    SELECT p.id AS project_id, p.name AS project_name, p.status, p.start_date, p.end_date,
           COALESCE(b.total_amount, 0)::DOUBLE PRECISION AS budget_total,
           COALESCE(b.spent_amount, 0)::DOUBLE PRECISION AS budget_spent,
           (SELECT COUNT(*) FROM expenses e WHERE e.project_id = p.id) AS expense_count
    FROM projects p
    LEFT JOIN budgets b ON b.project_id = p.id
"#;

/// Inventory exits charged to the project, grouped by product.
pub async fn products_used(
    pool: &PgPool,
    project: ProjectId,
) -> Result<Vec<ProductUsage>, sqlx::Error> {
    sqlx::query_as::<_, ProductUsage>(
        r#"
        SELECT pr.id AS product_id, pr.name AS product_name, pr.unit,
               COALESCE(SUM(m.quantity), 0)::DOUBLE PRECISION AS quantity,
               COALESCE(SUM(m.total_cost), 0)::DOUBLE PRECISION AS total_cost
        FROM inventory_movements m
        INNER JOIN products pr ON pr.id = m.product_id
        WHERE m.project_id = $1 AND m.kind = 'exit'
        GROUP BY pr.id, pr.name, pr.unit
        ORDER BY total_cost DESC
        "#,
    )
    .bind(project)
    .fetch_all(pool)
    .await
}

pub async fn finished_projects(pool: &PgPool) -> Result<Vec<ProjectFinanceRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectFinanceRow>(&format!(
        "{FINANCE_SELECT} WHERE p.status = 'finished' ORDER BY p.end_date DESC NULLS LAST, p.name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn all_projects(pool: &PgPool) -> Result<Vec<ProjectFinanceRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectFinanceRow>(&format!("{FINANCE_SELECT} ORDER BY p.name"))
        .fetch_all(pool)
        .await
}
