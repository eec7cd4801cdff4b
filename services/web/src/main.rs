use anyhow::{Context, Result};
use auth::{Authorizer, SessionConfig, SessionManager, SessionSweeper};
use common::database::{DatabaseConfig, health_check, init_pool};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use web::{AppState, config::ServerConfig, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting library service");

    let server_config = ServerConfig::load()?;
    let session_config = SessionConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // No request is served before the permission graph is known
    let authorizer = Authorizer::new(pool.clone())
        .with_check_timeout(server_config.permission_check_timeout());
    let report = authorizer
        .bootstrap()
        .await
        .context("Failed to bootstrap roles and permissions")?;
    if let Some(user_id) = report.promoted_admin {
        info!("User {} is now the administrator", user_id);
    }

    let sessions = SessionManager::new(session_config);
    let mut scheduler = SessionSweeper::new(sessions.clone())
        .start(&sessions.config().sweep_schedule)
        .await?;

    let app = create_router(AppState::new(pool, sessions, authorizer));

    let listener = TcpListener::bind(&server_config.bind_address).await?;
    info!("Library service listening on {}", server_config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    info!("Library service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
