use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelfetch_core::{
    create_fetcher, load_config, validate_config, FfmpegTranscoder, JobOrchestrator, StagingArea,
    Transcoder,
};
use reelfetch_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("reelfetch v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("REELFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Invalid configuration")?;

    // Create fetcher
    info!("Initializing {:?} fetcher", config.fetcher.backend);
    let fetcher = create_fetcher(&config.fetcher).context("Failed to create fetcher")?;

    // Create transcoder. A missing ffmpeg only matters once a job needs it.
    let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
    match transcoder.validate().await {
        Ok(()) => info!(
            "ffmpeg available at {}",
            config.transcoder.ffmpeg_path.display()
        ),
        Err(e) => warn!("ffmpeg check failed, trim/resize jobs will fail: {}", e),
    }

    let staging = StagingArea::new(config.staging.clone());
    info!(
        "Staging files under {}",
        config.staging.scratch_dir.display()
    );

    let orchestrator = Arc::new(JobOrchestrator::new(
        config.orchestrator.clone(),
        fetcher,
        transcoder,
        staging,
    ));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), orchestrator));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
}
