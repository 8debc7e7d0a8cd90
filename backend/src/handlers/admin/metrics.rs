use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};

use crate::{
    error::AppResult,
    models::{
        admin::{DashboardMetrics, SystemInfo, TableCount, UserMetrics},
        system_log::{RecentQuery, SystemLog},
    },
    repositories::{
        admin as admin_repo, project as project_repo, system_log as log_repo,
        ticket as ticket_repo, user as user_repo,
    },
    state::AppState,
};

const DEFAULT_ACTIVITY_LIMIT: i64 = 20;

pub async fn dashboard_metrics(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let now = Utc::now();
    let users = UserMetrics {
        totals: admin_repo::user_totals(&state.pool).await?,
        by_role: user_repo::count_by_role(&state.pool).await?,
    };

    Ok(Json(DashboardMetrics {
        users,
        projects_by_status: project_repo::count_by_status(&state.pool).await?,
        tickets_by_status: ticket_repo::count_by_status(&state.pool).await?,
        logs_last_24h: log_repo::count_by_level_since(&state.pool, now - Duration::hours(24))
            .await?,
        active_sessions: state.sessions.len(),
        generated_at: now,
    }))
}

pub async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<SystemLog>>> {
    let limit = query.limit(DEFAULT_ACTIVITY_LIMIT);
    Ok(Json(log_repo::recent(&state.pool, limit).await?))
}

pub fn system_info(state: &AppState) -> SystemInfo {
    SystemInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        pid: std::process::id(),
        started_at: state.started_at,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        active_sessions: state.sessions.len(),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
    }
}

pub async fn get_system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    Json(system_info(&state))
}

pub async fn database_stats(State(state): State<AppState>) -> AppResult<Json<Vec<TableCount>>> {
    Ok(Json(admin_repo::table_counts(&state.pool).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use crate::services::session_store::SessionUser;
    use crate::state::tests::test_state;
    use crate::types::UserId;

    #[tokio::test]
    async fn system_info_reports_live_sessions() {
        let state = test_state();
        state.sessions.create(&SessionUser {
            id: UserId(1),
            name: "Admin".into(),
            email: "admin@agro.test".into(),
            role: Role::Administrator,
        });

        let info = system_info(&state);
        assert_eq!(info.active_sessions, 1);
        assert_eq!(info.pid, std::process::id());
        assert!(info.uptime_seconds >= 0);
        assert!(!info.version.is_empty());
    }
}
