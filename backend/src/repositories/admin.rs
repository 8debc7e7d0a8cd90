use sqlx::PgPool;

use crate::models::admin::{TableCount, UserTotals};

/// Tables reported by the database overview, in display order.
pub const COUNTED_TABLES: &[&str] = &[
    "users",
    "projects",
    "phases",
    "milestones",
    "tasks",
    "budgets",
    "expenses",
    "resources",
    "providers",
    "products",
    "inventory_movements",
    "tickets",
    "system_logs",
];

pub async fn user_totals(pool: &PgPool) -> Result<UserTotals, sqlx::Error> {
    sqlx::query_as::<_, UserTotals>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE status = 'active') AS active,
               COUNT(*) FILTER (WHERE status = 'inactive') AS inactive
        FROM users
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn table_counts(pool: &PgPool) -> Result<Vec<TableCount>, sqlx::Error> {
    let mut counts = Vec::with_capacity(COUNTED_TABLES.len());
    for &table in COUNTED_TABLES {
        // Table names come from the constant list above, never from input.
        let rows = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;
        counts.push(TableCount { table, rows });
    }
    Ok(counts)
}
