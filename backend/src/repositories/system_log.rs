use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::system_log::{LevelCount, LogEntry, LogQuery, OriginCount, SystemLog};
use crate::types::LogId;

use super::common::{contains_pattern, push_clause};

const LOG_SELECT: &str = r#"
    SELECT l.id, l.level, l.origin, l.message, l.meta, l.user_id, u.name AS user_name,
           l.ip_address, l.created_at
    FROM system_logs l
    LEFT JOIN users u ON u.id = l.user_id
"#;

pub async fn insert(pool: &PgPool, entry: &LogEntry) -> Result<LogId, sqlx::Error> {
    sqlx::query_scalar::<_, LogId>(
        r#"
        INSERT INTO system_logs (level, origin, message, meta, user_id, ip_address)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(entry.level)
    .bind(&entry.origin)
    .bind(&entry.message)
    .bind(&entry.meta)
    .bind(entry.user_id)
    .bind(&entry.ip_address)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool, query: &LogQuery) -> Result<Vec<SystemLog>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(LOG_SELECT);
    let mut has_clause = false;

    if let Some(level) = query.level {
        push_clause(&mut builder, &mut has_clause);
        builder.push("l.level = ").push_bind(level);
    }
    if let Some(origin) = query.origin.as_deref().filter(|o| !o.trim().is_empty()) {
        push_clause(&mut builder, &mut has_clause);
        builder
            .push("l.origin ILIKE ")
            .push_bind(contains_pattern(origin));
    }
    if let Some(from) = query.from {
        push_clause(&mut builder, &mut has_clause);
        builder.push("l.created_at >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        push_clause(&mut builder, &mut has_clause);
        builder.push("l.created_at <= ").push_bind(to);
    }
    if let Some(user_id) = query.user_id {
        push_clause(&mut builder, &mut has_clause);
        builder.push("l.user_id = ").push_bind(user_id);
    }

    builder
        .push(" ORDER BY l.created_at DESC, l.id DESC LIMIT ")
        .push_bind(query.limit());

    builder.build_query_as::<SystemLog>().fetch_all(pool).await
}

pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<SystemLog>, sqlx::Error> {
    sqlx::query_as::<_, SystemLog>(&format!(
        "{LOG_SELECT} ORDER BY l.created_at DESC, l.id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: LogId) -> Result<Option<SystemLog>, sqlx::Error> {
    sqlx::query_as::<_, SystemLog>(&format!("{LOG_SELECT} WHERE l.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM system_logs WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}

pub async fn count_by_level_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<LevelCount>, sqlx::Error> {
    sqlx::query_as::<_, LevelCount>(
        r#"
        SELECT level, COUNT(*) AS total
        FROM system_logs
        WHERE created_at >= $1
        GROUP BY level
        ORDER BY total DESC
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await
}

pub async fn top_origins_since(
    pool: &PgPool,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<OriginCount>, sqlx::Error> {
    sqlx::query_as::<_, OriginCount>(
        r#"
        SELECT origin, COUNT(*) AS total
        FROM system_logs
        WHERE created_at >= $1
        GROUP BY origin
        ORDER BY total DESC, origin
        LIMIT $2
        "#,
    )
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn purge_before(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM system_logs WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
