use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::types::{text_enum, LogId, UserId};

text_enum! {
    pub enum LogLevel {
        Info => "info",
        Warn => "warn",
        Error => "error",
        Debug => "debug",
        Critical => "critical",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SystemLog {
    pub id: LogId,
    pub level: LogLevel,
    pub origin: String,
    pub message: String,
    pub meta: Option<Value>,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub origin: String,
    pub message: String,
    pub meta: Option<Value>,
    pub user_id: Option<UserId>,
    pub ip_address: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, origin: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            origin: origin.to_string(),
            message: message.into(),
            meta: None,
            user_id: None,
            ip_address: None,
        }
    }

    pub fn info(origin: &str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, origin, message)
    }

    pub fn warn(origin: &str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, origin, message)
    }

    pub fn error(origin: &str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, origin, message)
    }

    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn from_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub level: Option<LogLevel>,
    pub origin: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub user_id: Option<UserId>,
    pub limit: Option<i64>,
}

impl LogQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum StatsPeriod {
    #[serde(rename = "1h")]
    LastHour,
    #[default]
    #[serde(rename = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    LastMonth,
}

impl StatsPeriod {
    pub fn duration(&self) -> Duration {
        match self {
            StatsPeriod::LastHour => Duration::hours(1),
            StatsPeriod::LastDay => Duration::hours(24),
            StatsPeriod::LastWeek => Duration::days(7),
            StatsPeriod::LastMonth => Duration::days(30),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogStatsQuery {
    #[serde(default)]
    pub period: StatsPeriod,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LevelCount {
    pub level: LogLevel,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OriginCount {
    pub origin: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub period: StatsPeriod,
    pub since: DateTime<Utc>,
    pub total: i64,
    pub by_level: Vec<LevelCount>,
    pub by_origin: Vec<OriginCount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PurgeRequest {
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

impl RecentQuery {
    pub fn limit(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, 200)
    }
}
