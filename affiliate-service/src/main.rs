use affiliate_service::{
    build_router,
    config::AffiliateConfig,
    db,
    services::{Database, JwtService, PermissionService},
    AppState,
};
use platform_core::config::Environment;
use platform_core::middleware::create_ip_rate_limiter;
use platform_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), platform_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = AffiliateConfig::from_env()?;

    // Initialize tracing/logging using shared logic
    init_tracing(
        &config.service_name,
        &config.log_level,
        matches!(config.environment, Environment::Prod),
    );

    // Initialize metrics
    affiliate_service::services::metrics::init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting affiliate service"
    );

    // Initialize database pool and run migrations
    tracing::info!("Initializing database connection");
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database initialized successfully");

    let database = Database::new(pool);

    // Initialize JWT service
    let jwt = JwtService::new(&config.jwt)?;

    // Initialize rate limiter for the public tracking surface
    let public_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.public_ip_limit,
        config.rate_limit.public_ip_window_seconds,
    );
    tracing::info!("Rate limiter initialized for public routes");

    // Initialize services
    let permissions = PermissionService::new(database.clone());

    // Create application state
    let state = AppState {
        config: config.clone(),
        db: database,
        jwt,
        permissions,
        public_rate_limiter,
    };

    // Build application router
    let app = build_router(state).await?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    let service_span = tracing::info_span!(
        "service",
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
    );
    let _guard = service_span.enter();

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    // Give in-flight requests 30 seconds to complete
    tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
}
