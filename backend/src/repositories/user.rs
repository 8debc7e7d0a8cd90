//! Repository functions for user accounts and roles.

use sqlx::PgPool;

use crate::models::{
    role::{Role, RoleCount, RoleRecord},
    status::ActiveStatus,
    user::{UpdateUser, User},
};
use crate::types::UserId;

const USER_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.password_hash, r.name AS role, u.status,
           u.last_access, u.created_at, u.updated_at
    FROM users u
    INNER JOIN roles r ON r.id = u.role_id
"#;

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE LOWER(u.email) = LOWER($1)"))
        .bind(email.trim())
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.created_at DESC, u.id DESC"))
        .fetch_all(pool)
        .await
}

pub async fn email_taken(
    pool: &PgPool,
    email: &str,
    except: Option<UserId>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(email.trim())
    .bind(except)
    .fetch_one(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    status: ActiveStatus,
) -> Result<UserId, sqlx::Error> {
    sqlx::query_scalar::<_, UserId>(
        r#"
        INSERT INTO users (name, email, password_hash, role_id, status)
        VALUES ($1, LOWER($2), $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(name.trim())
    .bind(email.trim())
    .bind(password_hash)
    .bind(role.id())
    .bind(status)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: UserId, changes: &UpdateUser) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE(LOWER($3), email),
            role_id = COALESCE($4, role_id),
            status = COALESCE($5, status),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name.as_deref().map(str::trim))
    .bind(changes.email.as_deref().map(str::trim))
    .bind(changes.role.map(|role| role.id()))
    .bind(changes.status)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(
    pool: &PgPool,
    id: UserId,
    status: ActiveStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_password(
    pool: &PgPool,
    id: UserId,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn touch_last_access(pool: &PgPool, id: UserId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_access = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: UserId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_by_role(pool: &PgPool) -> Result<Vec<RoleCount>, sqlx::Error> {
    sqlx::query_as::<_, RoleCount>(
        r#"
        SELECT r.name AS role, COUNT(u.id) AS total
        FROM roles r
        LEFT JOIN users u ON u.role_id = r.id
        GROUP BY r.id, r.name
        ORDER BY r.id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn list_roles(pool: &PgPool) -> Result<Vec<RoleRecord>, sqlx::Error> {
    sqlx::query_as::<_, RoleRecord>(
        "SELECT id, name, description, permissions FROM roles ORDER BY id",
    )
    .fetch_all(pool)
    .await
}
