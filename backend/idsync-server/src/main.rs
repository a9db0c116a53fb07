use idsync_server::{AppState, background, build_router, logger, prometheus};

use idsync_provider::{HttpIdentityProvider, IdentityProvider};
use idsync_sync::{ShutdownCoordinator, SyncServices};

use std::error::Error;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config = idsync_config::Config::load()?;
    config.validate()?;

    // Initialize logger (before any other logging)
    logger::initialize(&config)?;

    info!("Starting idsync-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let metrics_handle = prometheus::install_recorder();

    let database_path = config.database_path()?;
    info!("Connecting to database: {}", database_path.display());
    let pool = idsync_db::connect(&database_path, config.database.max_connections).await?;

    let provider: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::new(&config.provider)?);
    let services = SyncServices::new(pool.clone(), provider, &config);

    if !config.scheduler.schedules.is_empty() {
        services.schedules.seed(&config.scheduler.schedules).await?;
    }

    if config.webhook.verification_secret().is_none() {
        warn!("Webhook signature verification DISABLED - set webhook.secret in production");
    }

    let shutdown = ShutdownCoordinator::new();

    let app_state = AppState {
        pool,
        services,
        shutdown: shutdown.clone(),
        metrics_handle,
    };

    let background_tasks = background::spawn(&app_state, &config);

    let app = build_router(app_state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            info!("HTTP server stopped accepting requests");
        })
        .await?;

    for task in background_tasks {
        if let Err(e) = task.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }

    info!("Graceful shutdown complete");
    Ok(())
}
