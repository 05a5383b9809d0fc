//! NeuroRadio - Main entry point
//!
//! Wires the database, blob store, playback engine, content generator,
//! and background scheduler together and serves the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neuroradio::api::{self, AppContext};
use neuroradio::config::Config;
use neuroradio::db;
use neuroradio::events::EventBus;
use neuroradio::generate::ContentGenerator;
use neuroradio::playback::{ClockSink, PlaybackEngine};
use neuroradio::scheduler::{BackgroundScheduler, SchedulerJob};
use neuroradio::storage::BlobStore;

/// Command-line arguments for neuroradio
#[derive(Parser, Debug)]
#[command(name = "neuroradio")]
#[command(about = "AI web radio service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "NEURORADIO_PORT")]
    port: Option<u16>,

    /// Folder holding the database and media blobs
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuroradio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Arc::new(
        Config::load(args.config.as_deref(), args.port, args.data_folder.as_deref())
            .context("Failed to load configuration")?,
    );

    info!("Starting NeuroRadio on port {}", config.port);
    info!("Data folder: {}", config.data_folder.display());

    std::fs::create_dir_all(&config.data_folder).context("Failed to create data folder")?;

    let db = db::init_database(&config.database_path())
        .await
        .context("Failed to initialize database")?;
    info!("Database ready at {}", config.database_path().display());

    let store = BlobStore::new(config.media_root()).context("Failed to initialize media store")?;
    let bus = EventBus::default();

    let (sink_tx, sink_rx) = mpsc::unbounded_channel();
    let sink = Arc::new(ClockSink::new(sink_tx));
    let engine = PlaybackEngine::new(sink, sink_rx, bus.clone(), config.crossfade_seconds);
    info!("Playback engine initialized");

    let generator = ContentGenerator::new(
        db.clone(),
        store.clone(),
        bus.clone(),
        config.generated_duration_seconds,
    );

    // Each scheduler tick generates one track and sweeps stale ones
    let job_generator = generator.clone();
    let job: SchedulerJob = Arc::new(move || {
        let generator = job_generator.clone();
        Box::pin(async move {
            let request = generator.background_request();
            if let Err(e) = generator.generate(request).await {
                tracing::error!("Background generation failed: {}", e);
            }
            match generator.cleanup_stale().await {
                Ok(0) => {}
                Ok(n) => info!("Cleanup removed {} stale tracks", n),
                Err(e) => tracing::error!("Cleanup failed: {}", e),
            }
        })
    });
    let scheduler = Arc::new(BackgroundScheduler::new(job, bus.clone()));
    scheduler.start(config.scheduler_interval_minutes);

    let ctx = AppContext {
        db,
        engine: Arc::clone(&engine),
        bus,
        store,
        generator,
        scheduler,
        config: Arc::clone(&config),
    };

    let app = api::create_router(ctx);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    engine.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
