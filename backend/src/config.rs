use anyhow::anyhow;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::cookies::{CookieOptions, SameSite};

// Upper bounds keep the chrono and std conversions below from overflowing.
const MAX_SESSION_ABSOLUTE_TTL_HOURS: u64 = 24 * 365;
const MAX_SESSION_IDLE_TTL_MINUTES: u64 = 60 * 24 * 365;
const MAX_SESSION_SWEEP_INTERVAL_MINUTES: u64 = 60 * 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub session_absolute_ttl_hours: u64,
    pub session_idle_ttl_minutes: u64,
    pub session_sweep_interval_minutes: u64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub cors_allow_origins: Vec<String>,
    pub login_rate_limit_per_minute: u32,
    pub log_retention_days: i64,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL must be set"))?;

        let cookie_same_site = match env::var("COOKIE_SAME_SITE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow!("Invalid COOKIE_SAME_SITE value: {}", raw))?,
            Err(_) => SameSite::Strict,
        };

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 3000),
            session_absolute_ttl_hours: parse_env("SESSION_ABSOLUTE_TTL_HOURS", 24),
            session_idle_ttl_minutes: parse_env("SESSION_IDLE_TTL_MINUTES", 120),
            session_sweep_interval_minutes: parse_env("SESSION_SWEEP_INTERVAL_MINUTES", 15),
            cookie_secure: parse_env("COOKIE_SECURE", false),
            cookie_same_site,
            cors_allow_origins,
            login_rate_limit_per_minute: parse_env("LOGIN_RATE_LIMIT_PER_MINUTE", 10),
            log_retention_days: parse_env("LOG_RETENTION_DAYS", 90),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@agrotechnova.com".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin123!".to_string()),
            admin_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrador".to_string()),
        })
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
        }
    }

    pub fn session_absolute_ttl(&self) -> chrono::Duration {
        let hours = self
            .session_absolute_ttl_hours
            .min(MAX_SESSION_ABSOLUTE_TTL_HOURS);
        chrono::Duration::hours(hours as i64)
    }

    pub fn session_idle_ttl(&self) -> chrono::Duration {
        let minutes = self.session_idle_ttl_minutes.min(MAX_SESSION_IDLE_TTL_MINUTES);
        chrono::Duration::minutes(minutes as i64)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        let minutes = self
            .session_sweep_interval_minutes
            .clamp(1, MAX_SESSION_SWEEP_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_missing_or_invalid_values() {
        assert_eq!(parse_env("AGRO_TEST_UNSET_VARIABLE", 7u64), 7);
        env::set_var("AGRO_TEST_INVALID_NUMBER", "abc");
        assert_eq!(parse_env("AGRO_TEST_INVALID_NUMBER", 15u64), 15);
        env::set_var("AGRO_TEST_VALID_NUMBER", " 42 ");
        assert_eq!(parse_env("AGRO_TEST_VALID_NUMBER", 15u64), 42);
    }

    #[test]
    fn session_durations_are_clamped() {
        let mut config = crate::state::tests::test_config();
        assert_eq!(config.session_absolute_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.session_idle_ttl(), chrono::Duration::minutes(120));
        assert_eq!(config.session_sweep_interval(), Duration::from_secs(15 * 60));

        config.session_absolute_ttl_hours = u64::MAX;
        config.session_idle_ttl_minutes = u64::MAX;
        config.session_sweep_interval_minutes = u64::MAX;
        assert_eq!(
            config.session_absolute_ttl(),
            chrono::Duration::hours(MAX_SESSION_ABSOLUTE_TTL_HOURS as i64)
        );
        assert_eq!(
            config.session_idle_ttl(),
            chrono::Duration::minutes(MAX_SESSION_IDLE_TTL_MINUTES as i64)
        );
        assert_eq!(
            config.session_sweep_interval(),
            Duration::from_secs(MAX_SESSION_SWEEP_INTERVAL_MINUTES * 60)
        );

        config.session_sweep_interval_minutes = 0;
        assert_eq!(config.session_sweep_interval(), Duration::from_secs(60));
    }
}
