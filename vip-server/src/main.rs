//! vip-server - Volunteer Intake Portal
//!
//! Serves the public registration wizard API and the staff review area.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vip_common::auth::AllowList;
use vip_common::config::TomlConfig;
use vip_common::db::init_database;
use vip_common::settings::SettingsService;
use vip_server::{build_router, AppState};

/// Command-line arguments for vip-server
#[derive(Parser, Debug)]
#[command(name = "vip-server")]
#[command(about = "Volunteer Intake Portal HTTP service")]
#[command(version)]
struct Args {
    /// Config file (falls back to VIP_CONFIG, then ~/.config/vip/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the config file
    #[arg(short, long, env = "VIP_PORT")]
    port: Option<u16>,

    /// Database file, overriding the config file
    #[arg(long, env = "VIP_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identity first, before any database delay
    info!(
        "Starting Volunteer Intake Portal (vip-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let roles = AllowList::from_entries(&config.staff);
    if roles.is_empty() {
        warn!("No [[staff]] entries configured; the admin area will refuse everyone");
    } else {
        info!("Loaded {} staff entries", roles.len());
    }

    let settings = SettingsService::load_cached(pool.clone(), Some(config.settings_cache_path.clone()));
    {
        let settings = settings.clone();
        tokio::spawn(async move {
            match settings.reconcile().await {
                Ok(current) => info!("App settings reconciled ({})", current.app_name),
                Err(e) => warn!("Serving cached app settings, reconcile failed: {}", e),
            }
        });
    }

    let state = AppState::new(
        pool,
        Arc::new(roles),
        settings,
        Duration::from_millis(config.request_timeout_ms),
    );
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vip-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
