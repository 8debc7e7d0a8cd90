//! Writes audit rows to `system_logs`.
//!
//! Handlers depend on the [`SystemLogRecorder`] trait so tests can swap in a
//! mock and never touch the database.

use async_trait::async_trait;
use axum::http::HeaderMap;
use sqlx::PgPool;

use crate::models::system_log::LogEntry;
use crate::repositories::system_log as log_repo;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SystemLogRecorder: Send + Sync {
    async fn record(&self, entry: LogEntry) -> Result<(), sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct SystemLogService {
    pool: PgPool,
}

impl SystemLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SystemLogRecorder for SystemLogService {
    async fn record(&self, entry: LogEntry) -> Result<(), sqlx::Error> {
        log_repo::insert(&self.pool, &entry).await.map(|_| ())
    }
}

/// Audit writes never fail the request that triggered them.
pub async fn record_quietly(recorder: &dyn SystemLogRecorder, entry: LogEntry) {
    let origin = entry.origin.clone();
    if let Err(err) = recorder.record(entry).await {
        tracing::warn!(error = ?err, origin = %origin, "Failed to record system log");
    }
}

pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        return value
            .split(',')
            .next()
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn record_quietly_swallows_failures() {
        let mut recorder = MockSystemLogRecorder::new();
        recorder
            .expect_record()
            .times(1)
            .returning(|_| Err(sqlx::Error::PoolTimedOut));

        record_quietly(&recorder, LogEntry::info("auth", "Inicio de sesión")).await;
    }

    #[test]
    fn client_ip_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.1.1.1, 172.16.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.0.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.1.1.1"));

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers).as_deref(), Some("192.168.0.9"));

        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
