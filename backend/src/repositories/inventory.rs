use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::inventory::{
    InventoryStats, Movement, MovementKind, MovementQuery, ProductMovementSummary,
};
use crate::types::{MovementId, ProductId, ProjectId, UserId};

use super::common::push_clause;

const MOVEMENT_SELECT: &str = r#"
    SELECT m.id, m.product_id, pr.name AS product_name, pr.unit, m.project_id,
           p.name AS project_name, m.kind, m.quantity, m.unit_cost, m.total_cost,
           m.reason, m.user_id, m.created_at
    FROM inventory_movements m
    INNER JOIN products pr ON pr.id = m.product_id
    LEFT JOIN projects p ON p.id = m.project_id
"#;

pub struct NewMovement<'a> {
    pub product_id: ProductId,
    pub project_id: Option<ProjectId>,
    pub kind: MovementKind,
    pub quantity: f64,
    pub unit_cost: f64,
    pub reason: Option<&'a str>,
    pub user_id: UserId,
}

pub async fn insert(
    conn: &mut PgConnection,
    movement: &NewMovement<'_>,
) -> Result<MovementId, sqlx::Error> {
    sqlx::query_scalar::<_, MovementId>(
        r#"
        INSERT INTO inventory_movements
            (product_id, project_id, kind, quantity, unit_cost, total_cost, reason, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(movement.product_id)
    .bind(movement.project_id)
    .bind(movement.kind)
    .bind(movement.quantity)
    .bind(movement.unit_cost)
    .bind(movement.quantity * movement.unit_cost)
    .bind(movement.reason)
    .bind(movement.user_id)
    .fetch_one(conn)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: MovementId) -> Result<Option<Movement>, sqlx::Error> {
    sqlx::query_as::<_, Movement>(&format!("{MOVEMENT_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, query: &MovementQuery) -> Result<Vec<Movement>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(MOVEMENT_SELECT);
    let mut has_clause = false;

    if let Some(product) = query.product_id {
        push_clause(&mut builder, &mut has_clause);
        builder.push("m.product_id = ").push_bind(product);
    }
    if let Some(project) = query.project_id {
        push_clause(&mut builder, &mut has_clause);
        builder.push("m.project_id = ").push_bind(project);
    }
    if let Some(kind) = query.kind {
        push_clause(&mut builder, &mut has_clause);
        builder.push("m.kind = ").push_bind(kind);
    }
    if let Some(from) = query.from {
        push_clause(&mut builder, &mut has_clause);
        builder.push("m.created_at::date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        push_clause(&mut builder, &mut has_clause);
        builder.push("m.created_at::date <= ").push_bind(to);
    }

    builder
        .push(" ORDER BY m.created_at DESC, m.id DESC LIMIT ")
        .push_bind(query.limit());

    builder.build_query_as::<Movement>().fetch_all(pool).await
}

pub async fn summary_by_product(
    pool: &PgPool,
    product: ProductId,
) -> Result<Option<ProductMovementSummary>, sqlx::Error> {
    sqlx::query_as::<_, ProductMovementSummary>(
        r#"
        SELECT pr.id AS product_id, pr.name AS product_name, pr.current_stock,
               COALESCE(SUM(m.quantity) FILTER (WHERE m.kind = 'entry'), 0)::DOUBLE PRECISION AS total_entries,
               COALESCE(SUM(m.quantity) FILTER (WHERE m.kind = 'exit'), 0)::DOUBLE PRECISION AS total_exits,
               COALESCE(SUM(m.total_cost) FILTER (WHERE m.kind = 'entry'), 0)::DOUBLE PRECISION AS entry_cost,
               COALESCE(SUM(m.total_cost) FILTER (WHERE m.kind = 'exit'), 0)::DOUBLE PRECISION AS exit_cost,
               COUNT(m.id) AS movement_count
        FROM products pr
        LEFT JOIN inventory_movements m ON m.product_id = pr.id
        WHERE pr.id = $1
        GROUP BY pr.id, pr.name, pr.current_stock
        "#,
    )
    .bind(product)
    .fetch_optional(pool)
    .await
}

pub async fn stats(pool: &PgPool) -> Result<InventoryStats, sqlx::Error> {
    sqlx::query_as::<_, InventoryStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM inventory_movements) AS total_movements,
            (SELECT COUNT(*) FROM inventory_movements WHERE kind = 'entry') AS entries,
            (SELECT COUNT(*) FROM inventory_movements WHERE kind = 'exit') AS exits,
            (SELECT COALESCE(SUM(total_cost), 0)::DOUBLE PRECISION
               FROM inventory_movements WHERE kind = 'entry') AS entry_value,
            (SELECT COALESCE(SUM(total_cost), 0)::DOUBLE PRECISION
               FROM inventory_movements WHERE kind = 'exit') AS exit_value,
            (SELECT COUNT(*) FROM products
               WHERE status = 'active' AND current_stock <= minimum_stock) AS low_stock_products
        "#,
    )
    .fetch_one(pool)
    .await
}
