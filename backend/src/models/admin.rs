use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::{project::StatusCount, role::RoleCount, system_log::LevelCount};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserTotals {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserMetrics {
    #[serde(flatten)]
    pub totals: UserTotals,
    pub by_role: Vec<RoleCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub users: UserMetrics,
    pub projects_by_status: Vec<StatusCount>,
    pub tickets_by_status: Vec<StatusCount>,
    pub logs_last_24h: Vec<LevelCount>,
    pub active_sessions: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub active_sessions: usize,
    pub os: &'static str,
    pub arch: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}
