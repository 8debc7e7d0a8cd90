use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    handlers::found,
    models::system_log::{
        LogEntry, LogQuery, LogStats, LogStatsQuery, PurgeRequest, RecentQuery, SystemLog,
    },
    repositories::system_log as log_repo,
    services::{session_store::Session, system_log::record_quietly},
    state::AppState,
    types::LogId,
};

const TOP_ORIGINS: i64 = 10;
const DEFAULT_RECENT_LIMIT: i64 = 50;

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Vec<SystemLog>>> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if to < from {
            return Err(AppError::BadRequest(
                "La fecha final debe ser posterior a la inicial".into(),
            ));
        }
    }
    Ok(Json(log_repo::list(&state.pool, &query).await?))
}

pub async fn log_stats(
    State(state): State<AppState>,
    Query(query): Query<LogStatsQuery>,
) -> AppResult<Json<LogStats>> {
    let since = Utc::now() - query.period.duration();
    Ok(Json(LogStats {
        period: query.period,
        since,
        total: log_repo::count_since(&state.pool, since).await?,
        by_level: log_repo::count_by_level_since(&state.pool, since).await?,
        by_origin: log_repo::top_origins_since(&state.pool, since, TOP_ORIGINS).await?,
    }))
}

pub async fn recent_logs(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<SystemLog>>> {
    let limit = query.limit(DEFAULT_RECENT_LIMIT);
    Ok(Json(log_repo::recent(&state.pool, limit).await?))
}

fn retention_days(requested: Option<i64>, default: i64) -> AppResult<i64> {
    let days = requested.unwrap_or(default);
    if days <= 0 {
        return Err(AppError::BadRequest(
            "Los días de retención deben ser mayores a 0".into(),
        ));
    }
    Ok(days)
}

/// Deletes rows older than `days` (defaults to the configured retention).
pub async fn purge_logs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Option<Json<PurgeRequest>>,
) -> AppResult<Json<Value>> {
    let requested = payload.and_then(|Json(body)| body.days);
    let days = retention_days(requested, state.config.log_retention_days)?;
    let cutoff = Utc::now() - Duration::days(days);

    let deleted = log_repo::purge_before(&state.pool, cutoff).await?;
    tracing::info!(deleted, days, user_id = %session.user_id, "System logs purged");
    record_quietly(
        state.system_log.as_ref(),
        LogEntry::warn("admin", format!("Purga de logs: {} registros eliminados", deleted))
            .by(session.user_id)
            .meta(json!({ "days": days, "deleted": deleted })),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "cutoff": cutoff,
    })))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<LogId>,
) -> AppResult<Json<SystemLog>> {
    Ok(Json(found(
        log_repo::find_by_id(&state.pool, id).await?,
        "Registro no encontrado",
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_defaults_to_config_and_rejects_non_positive() {
        assert_eq!(retention_days(None, 90).unwrap(), 90);
        assert_eq!(retention_days(Some(7), 90).unwrap(), 7);
        assert!(matches!(
            retention_days(Some(0), 90),
            Err(AppError::BadRequest(_))
        ));
        assert!(retention_days(Some(-3), 90).is_err());
    }
}
