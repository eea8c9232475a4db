//! scribe-pm - Scribe project manager
//!
//! **Module Identity:**
//! - Name: scribe-pm
//! - Default port: 5740
//!
//! Serves the project, section, abstract and review APIs over the SQLite
//! database in the root folder, and forwards AI work to scribe-ai.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scribe_common::config::{
    load_toml_config, load_toml_config_from, RootFolderInitializer, RootFolderResolver,
};
use scribe_common::db::{init_database, load_autosave_debounce};
use scribe_common::events::EventBus;
use tokio::signal;
use tracing::{error, info, warn};

use scribe_pm::config::{AiServiceSettings, DEFAULT_PORT, EVENT_BUS_CAPACITY, MODULE_NAME};
use scribe_pm::{build_router, AiClient, AppState, AutosaveHandle};

/// Command-line arguments for scribe-pm
#[derive(Parser, Debug)]
#[command(name = "scribe-pm")]
#[command(about = "Project manager service for Scribe")]
#[command(version)]
struct Args {
    /// Root folder holding scribe.db (overrides ENV and TOML)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the TOML config)
    #[arg(short, long, env = "SCRIBE_PM_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "SCRIBE_PM_BIND")]
    bind: String,

    /// TOML config file (default: ~/.config/scribe/scribe-pm.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// scribe-ai base URL (overrides the TOML config)
    #[arg(long, env = "SCRIBE_AI_URL")]
    ai_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = match &args.config {
        Some(path) => load_toml_config_from(path)?,
        None => load_toml_config(MODULE_NAME)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .init();

    // Build identification comes first, before any database delay
    info!(
        "Starting Scribe Project Manager (scribe-pm) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    let db = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready: {}", db_path.display());
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let ai_settings = AiServiceSettings::from_toml(&toml_config, args.ai_url.clone());
    info!("AI service: {}", ai_settings.url);
    if ai_settings.service_key.is_none() {
        warn!("Service key not configured - calls to scribe-ai carry no credentials");
    }
    let ai = AiClient::new(ai_settings).context("Failed to build AI client")?;

    let event_bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
    let autosave_delay = load_autosave_debounce(&db).await?;
    let autosave = AutosaveHandle::spawn(db.clone(), event_bus.clone(), autosave_delay);

    let state = AppState::new(db.clone(), event_bus, ai, autosave.clone());
    let app = build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", args.bind, port)
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("scribe-pm listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Pending drafts must reach the database before exit
    match autosave.flush_all().await {
        Ok(written) => info!(written, "Autosave drafts flushed"),
        Err(e) => warn!("Failed to flush autosave drafts: {}", e),
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
