//! Drowsiness Monitoring Server
//!
//! Socket.IO gateway that turns a stream of camera frames into a debounced
//! per-connection drowsiness status, plus info and metrics endpoints.

use axum::{routing::get, Router};
use dms::{build_extractor, DmsError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod gateway;
pub mod metrics;
pub mod pipeline;
pub mod registry;
mod routes;

use crate::config::{AppConfig, LogFormat, LoggingConfig, ServerConfig};
use crate::pipeline::FramePipeline;
use crate::registry::SessionRegistry;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detector error: {0}")]
    Dms(#[from] DmsError),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state shared across handlers
pub struct AppState {
    /// Live sessions
    pub registry: SessionRegistry,
    /// Frame analysis shared by all connections
    pub pipeline: Arc<FramePipeline>,
    /// Network and per-connection settings
    pub server: ServerConfig,
    /// Prometheus render handle (absent when no recorder is installed)
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: &AppConfig, pipeline: FramePipeline, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            registry: SessionRegistry::new(config.dms.clone()),
            pipeline: Arc::new(pipeline),
            server: config.server.clone(),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = state.server.cors_permissive;
    let socket_layer = gateway::socket_layer(Arc::clone(&state));
    let router = Router::new()
        .route("/", get(routes::info::get_info))
        .route("/metrics", get(routes::metrics::get_metrics))
        .with_state(state)
        .layer(socket_layer)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), ServerError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ServerError::Logging(format!("unknown log level '{}'", config.level)))?;

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    let result = match config.format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.map_err(|e| ServerError::Logging(e.to_string()))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    let extractor = build_extractor(&config.dms)?;
    let pipeline = FramePipeline::new(extractor);
    info!(extractor = pipeline.extractor_name(), "Landmark extractor ready");

    let handle = metrics::install_recorder()?;
    let state = Arc::new(AppState::new(&config, pipeline, Some(handle)));
    let app = create_router(state);

    info!("Starting drowsiness server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
