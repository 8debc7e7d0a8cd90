use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agrotechnova_backend::{
    config::Config, db::connection::create_pool, repositories::system_log as log_repo,
};

/// Offline counterpart of `POST /api/admin/logs/purge`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "log_cleanup=info,agrotechnova_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let days = config.log_retention_days;
    if days <= 0 {
        anyhow::bail!("LOG_RETENTION_DAYS must be greater than 0 (got {})", days);
    }

    let pool = create_pool(&config).await?;
    let cutoff = Utc::now() - Duration::days(days);
    let deleted = log_repo::purge_before(&pool, cutoff).await?;
    tracing::info!(deleted, days, %cutoff, "Deleted expired system logs");

    sqlx::query("VACUUM (ANALYZE) system_logs")
        .execute(&pool)
        .await?;

    Ok(())
}
