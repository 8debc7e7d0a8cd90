use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        session_store::{SessionPolicy, SessionStore},
        system_log::{SystemLogRecorder, SystemLogService},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub system_log: Arc<dyn SystemLogRecorder>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let policy = SessionPolicy {
            absolute_ttl: config.session_absolute_ttl(),
            idle_ttl: config.session_idle_ttl(),
        };
        Self {
            system_log: Arc::new(SystemLogService::new(pool.clone())),
            sessions: Arc::new(SessionStore::new(policy)),
            pool,
            config,
            started_at: Utc::now(),
        }
    }

    pub fn with_system_log(mut self, recorder: Arc<dyn SystemLogRecorder>) -> Self {
        self.system_log = recorder;
        self
    }
}
