use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agrotechnova_backend::{
    config::Config,
    db::connection::create_pool,
    models::{role::Role, status::ActiveStatus},
    repositories::user as user_repo,
    routes::app_router,
    services::session_store::spawn_session_sweeper,
    state::AppState,
    utils::password::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrotechnova_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        bind = %config.bind_addr(),
        session_absolute_ttl_hours = config.session_absolute_ttl_hours,
        session_idle_ttl_minutes = config.session_idle_ttl_minutes,
        cookie_secure = config.cookie_secure,
        cors_allow_origins = ?config.cors_allow_origins,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    ensure_default_admin(&pool, &config).await?;

    let state = AppState::new(pool, config.clone());
    spawn_session_sweeper(state.sessions.clone(), config.session_sweep_interval());

    let app = app_router(state)?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// First boot on an empty database gets one administrator account.
async fn ensure_default_admin(pool: &sqlx::PgPool, config: &Config) -> anyhow::Result<()> {
    if user_repo::find_by_email(pool, &config.admin_email)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let hash = hash_password(&config.admin_password)?;
    let id = user_repo::create(
        pool,
        &config.admin_name,
        &config.admin_email,
        &hash,
        Role::Administrator,
        ActiveStatus::Active,
    )
    .await?;
    tracing::warn!(user_id = %id, email = %config.admin_email, "Default administrator created; change its password");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
