use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use shop::{
    AppState, MIGRATOR,
    config::{AdminBootstrap, ServerConfig},
    create_router,
    jwt::{JwtConfig, JwtService},
    repositories::{PgSweetRepository, PgUserRepository},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting sweet shop service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config)?;

    let app_state = AppState::new(
        Arc::new(PgSweetRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        jwt_service,
    );

    match AdminBootstrap::from_env() {
        Some(admin) => app_state
            .auth_service
            .ensure_admin(&admin)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bootstrap admin account: {}", e))?,
        None => warn!("ADMIN_USERNAME/ADMIN_EMAIL/ADMIN_PASSWORD not set, no admin bootstrapped"),
    }

    // Start the web server
    let app = create_router(app_state);

    let server_config = ServerConfig::from_env()?;
    let addr = server_config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Sweet shop service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down sweet shop service");
        })
        .await?;

    Ok(())
}
