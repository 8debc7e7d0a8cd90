use sqlx::PgPool;

use crate::models::provider::{CreateProvider, Provider, UpdateProvider};
use crate::models::status::ActiveStatus;
use crate::types::ProviderId;

const PROVIDER_SELECT: &str = r#"
    SELECT id, name, tax_id, contact, phone, email, address, product_types, status,
           created_at, updated_at
    FROM providers
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Provider>, sqlx::Error> {
    sqlx::query_as::<_, Provider>(&format!("{PROVIDER_SELECT} ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<Provider>, sqlx::Error> {
    sqlx::query_as::<_, Provider>(&format!(
        "{PROVIDER_SELECT} WHERE status = 'active' ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: ProviderId) -> Result<Option<Provider>, sqlx::Error> {
    sqlx::query_as::<_, Provider>(&format!("{PROVIDER_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// True when another provider already uses the name or tax id.
pub async fn identity_taken(
    pool: &PgPool,
    name: Option<&str>,
    tax_id: Option<&str>,
    except: Option<ProviderId>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM providers
            WHERE (LOWER(name) = LOWER($1) OR tax_id = $2)
              AND ($3::BIGINT IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(name.map(str::trim))
    .bind(tax_id.map(str::trim))
    .bind(except)
    .fetch_one(pool)
    .await
}

pub async fn create(pool: &PgPool, payload: &CreateProvider) -> Result<ProviderId, sqlx::Error> {
    sqlx::query_scalar::<_, ProviderId>(
        r#"
        INSERT INTO providers (name, tax_id, contact, phone, email, address, product_types)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.tax_id.trim())
    .bind(&payload.contact)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(&payload.address)
    .bind(&payload.product_types)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: ProviderId,
    changes: &UpdateProvider,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE providers SET
            name = COALESCE($2, name),
            tax_id = COALESCE($3, tax_id),
            contact = COALESCE($4, contact),
            phone = COALESCE($5, phone),
            email = COALESCE($6, email),
            address = COALESCE($7, address),
            product_types = COALESCE($8, product_types),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(changes.tax_id.as_deref().map(str::trim))
    .bind(&changes.contact)
    .bind(&changes.phone)
    .bind(&changes.email)
    .bind(&changes.address)
    .bind(&changes.product_types)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(
    pool: &PgPool,
    id: ProviderId,
    status: ActiveStatus,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE providers SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: ProviderId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM providers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
