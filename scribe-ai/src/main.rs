//! scribe-ai - AI functions microservice
//!
//! **Module Identity:**
//! - Name: scribe-ai
//! - Default port: 5741
//!
//! Relays section reviews, document reviews and abstract generation to an
//! OpenAI-compatible chat gateway.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scribe_common::api::ServiceKey;
use scribe_common::config::{load_toml_config, load_toml_config_from};
use tokio::signal;
use tracing::{info, warn};

use scribe_ai::config::{self, FunctionSettings, DEFAULT_PORT, MODULE_NAME};
use scribe_ai::{build_router, AppState, GatewayClient};

/// Command-line arguments for scribe-ai
#[derive(Parser, Debug)]
#[command(name = "scribe-ai")]
#[command(about = "AI functions microservice for Scribe")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the TOML config)
    #[arg(short, long, env = "SCRIBE_AI_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "SCRIBE_AI_BIND")]
    bind: String,

    /// TOML config file (default: ~/.config/scribe/scribe-ai.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chat gateway URL (overrides the TOML config)
    #[arg(long, env = "SCRIBE_AI_GATEWAY_URL")]
    gateway_url: Option<String>,
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

    info!(
        "Starting Scribe AI functions (scribe-ai) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let gateway_config = config::gateway_config(&toml_config, args.gateway_url.clone());
    info!("Chat gateway: {}", gateway_config.url);
    let gateway = GatewayClient::new(gateway_config).context("Failed to build gateway client")?;
    let gateway_ready = gateway.has_api_key();

    let service_key = ServiceKey::new(config::service_key(&toml_config).as_deref());
    if service_key.is_disabled() {
        warn!("Service key not configured - function endpoints are open");
    } else {
        info!("✓ Service key authentication enabled");
    }

    let state = AppState::new(
        Arc::new(gateway),
        FunctionSettings::from_toml(&toml_config),
        service_key,
    )
    .with_gateway_ready(gateway_ready);
    let app = build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", args.bind, port)
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("scribe-ai listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
