use sqlx::{PgConnection, PgPool};

use crate::models::product::{CreateProduct, InventoryValue, Product, UpdateProduct};
use crate::types::{ProductId, ProviderId};

const PRODUCT_SELECT: &str = r#"
    SELECT pr.id, pr.name, pr.description, pr.kind, pr.category, pr.unit,
           pr.current_stock, pr.minimum_stock, pr.unit_cost, pr.provider_id,
           pv.name AS provider_name, pr.status, pr.organic, pr.created_at, pr.updated_at
    FROM products pr
    LEFT JOIN providers pv ON pv.id = pr.provider_id
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} ORDER BY pr.name"))
        .fetch_all(pool)
        .await
}

pub async fn list_by_provider(
    pool: &PgPool,
    provider: ProviderId,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "{PRODUCT_SELECT} WHERE pr.provider_id = $1 ORDER BY pr.name"
    ))
    .bind(provider)
    .fetch_all(pool)
    .await
}

pub async fn list_low_stock(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "{PRODUCT_SELECT} WHERE pr.status = 'active' AND pr.current_stock <= pr.minimum_stock \
         ORDER BY pr.current_stock - pr.minimum_stock, pr.name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_available(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "{PRODUCT_SELECT} WHERE pr.status = 'active' AND pr.current_stock > 0 ORDER BY pr.name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_organic(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "{PRODUCT_SELECT} WHERE pr.organic AND pr.status = 'active' ORDER BY pr.name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_by_kind(pool: &PgPool, kind: &str) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "{PRODUCT_SELECT} WHERE LOWER(pr.kind) = LOWER($1) ORDER BY pr.name"
    ))
    .bind(kind.trim())
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: ProductId) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE pr.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns `(current_stock, unit_cost)` with the row locked until commit.
pub async fn lock_stock(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<(f64, f64)>, sqlx::Error> {
    sqlx::query_as::<_, (f64, f64)>(
        "SELECT current_stock, unit_cost FROM products WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn set_stock(
    conn: &mut PgConnection,
    id: ProductId,
    stock: f64,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE products SET current_stock = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(stock)
            .execute(conn)
            .await?;
    Ok(result.rows_affected())
}

pub async fn create(pool: &PgPool, payload: &CreateProduct) -> Result<ProductId, sqlx::Error> {
    sqlx::query_scalar::<_, ProductId>(
        r#"
        INSERT INTO products
            (name, description, kind, category, unit, current_stock, minimum_stock, unit_cost, provider_id, organic)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.kind.trim())
    .bind(&payload.category)
    .bind(payload.unit.trim())
    .bind(payload.current_stock)
    .bind(payload.minimum_stock)
    .bind(payload.unit_cost)
    .bind(payload.provider_id)
    .bind(payload.organic)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: ProductId,
    changes: &UpdateProduct,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE products SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            kind = COALESCE($4, kind),
            category = COALESCE($5, category),
            unit = COALESCE($6, unit),
            minimum_stock = COALESCE($7, minimum_stock),
            unit_cost = COALESCE($8, unit_cost),
            provider_id = COALESCE($9, provider_id),
            status = COALESCE($10, status),
            organic = COALESCE($11, organic),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(&changes.description)
    .bind(&changes.kind)
    .bind(&changes.category)
    .bind(&changes.unit)
    .bind(changes.minimum_stock)
    .bind(changes.unit_cost)
    .bind(changes.provider_id)
    .bind(changes.status)
    .bind(changes.organic)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: ProductId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn inventory_value(pool: &PgPool) -> Result<InventoryValue, sqlx::Error> {
    sqlx::query_as::<_, InventoryValue>(
        r#"
        SELECT COUNT(*) AS product_count,
               COALESCE(SUM(current_stock), 0)::DOUBLE PRECISION AS total_units,
               COALESCE(SUM(current_stock * unit_cost), 0)::DOUBLE PRECISION AS total_value
        FROM products
        WHERE status = 'active'
        "#,
    )
    .fetch_one(pool)
    .await
}
