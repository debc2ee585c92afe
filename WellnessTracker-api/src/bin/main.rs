use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use wellness_tracker_api::{create_app, AppConfig, AppState};
use wellness_tracker_domain::database::{initialize_database_pool, DatabaseConfig};
use wellness_tracker_domain::health::database_description;
use wellness_tracker_domain::services::{create_tip_service, TipServiceTrait};

/// The main entry point for the WellnessTracker API server
///
/// Loads `.env`, sets up tracing, opens and migrates the database, seeds the
/// built-in health tips when enabled and serves until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting WellnessTracker API server");

    let config = AppConfig::from_env().context("Invalid server configuration")?;
    let db_config = DatabaseConfig::from_env().context("Invalid database configuration")?;

    let pool = initialize_database_pool(&db_config).context("Failed to initialize database pool")?;
    info!("Using {}", database_description(&pool));

    if config.seed_health_tips {
        // A failed seed leaves the tip of the day on its fallback, so keep serving
        match create_tip_service(pool.clone()).seed_default_tips().await {
            Ok(inserted) => info!("Inserted {} default health tips", inserted),
            Err(e) => error!("Failed to seed default health tips: {}", e),
        }
    }

    let auth = config.auth_config();
    if auth.bypass_user.is_some() {
        warn!("Authentication bypass is enabled; all requests run as {}", config.dev_user_id);
    }

    let state = AppState::from_pool(pool, auth, config.environment.clone());
    let app = create_app(state, &config.cors_allowed_origins);

    let addr = config.socket_addr();
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
