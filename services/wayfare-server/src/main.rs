//! Wayfare API Server
//!
//! REST backend for hotel and restaurant bookings: pricing, payment-intent
//! orchestration, and the booking lifecycle over PostgreSQL.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! wayfare-server
//!
//! # Start with custom config
//! wayfare-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! WAYFARE__SERVER__PORT=8080 wayfare-server
//! ```

mod config;

use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wayfare_api::{create_router, ApiConfig, AppState, ReadinessProbe};
use wayfare_booking::BookingService;
use wayfare_db::{Database, DatabaseConfig as DbConfig};
use wayfare_gateway::{StripeConfig, StripeGateway};

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Wayfare API Server - hotel and restaurant booking backend
#[derive(Parser, Debug)]
#[command(name = "wayfare-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "WAYFARE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "WAYFARE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WAYFARE_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WAYFARE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "WAYFARE_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Payment processor secret key
    #[arg(long, env = "STRIPE_SECRET_KEY")]
    stripe_secret_key: Option<String>,

    /// Payment processor publishable key
    #[arg(long, env = "STRIPE_PUBLIC_KEY")]
    stripe_public_key: Option<String>,

    /// Enable development mode (relaxed validation)
    #[arg(long, env = "WAYFARE_DEV_MODE")]
    dev_mode: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.postgres_url = db_url;
    }
    if let Some(secret_key) = args.stripe_secret_key {
        server_config.gateway.secret_key = secret_key;
    }
    if let Some(public_key) = args.stripe_public_key {
        server_config.gateway.public_key = public_key;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Wayfare API Server"
    );

    validate_config(&server_config, args.dev_mode)?;

    // Database
    let db = init_database(&server_config.database).await?;

    // Payment gateway
    let gateway = StripeGateway::new(StripeConfig {
        secret_key: server_config.gateway.secret_key.clone(),
        public_key: server_config.gateway.public_key.clone(),
        base_url: server_config.gateway.base_url.clone(),
        timeout_secs: server_config.gateway.timeout_secs,
    })?;

    // Booking core
    let store = Arc::new(db.booking_store());
    let bookings = Arc::new(BookingService::new(
        store.clone(),
        store.clone(),
        Arc::new(gateway),
        server_config.pricing.clone(),
    ));

    let state = AppState::new(bookings, store, Arc::new(DbReadiness { db: db.clone() }));

    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_tracing: server_config.api.enable_tracing,
    };

    let app = create_router(state, api_config);

    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

/// Validate configuration
fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    if !dev_mode && config.gateway.secret_key.is_empty() {
        anyhow::bail!(
            "Payment processor secret key must be set in production. Set STRIPE_SECRET_KEY."
        );
    }
    if !dev_mode && config.gateway.public_key.is_empty() {
        anyhow::bail!(
            "Payment processor public key must be set in production. Set STRIPE_PUBLIC_KEY."
        );
    }
    Ok(())
}

/// Initialize database connection and run migrations
async fn init_database(config: &config::DatabaseSettings) -> anyhow::Result<Arc<Database>> {
    tracing::info!("Connecting to database...");

    let db_config = DbConfig {
        postgres_url: config.postgres_url.clone(),
        pg_max_connections: config.max_connections,
        pg_min_connections: config.min_connections,
        pg_acquire_timeout_secs: config.connect_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;

    tracing::info!("Database connected successfully");

    if config.run_migrations {
        db.migrate().await?;
    }

    if !db.health_check().await {
        anyhow::bail!("Database health check failed");
    }

    Ok(Arc::new(db))
}

/// Readiness probe over the live connection pool
struct DbReadiness {
    db: Arc<Database>,
}

#[async_trait]
impl ReadinessProbe for DbReadiness {
    async fn ready(&self) -> bool {
        self.db.health_check().await
    }
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
