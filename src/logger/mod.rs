//! Logger module
//!
//! Provides logging utilities for the snippet server including:
//! - Subscriber setup (text or JSON, stdout or file)
//! - Server lifecycle logging
//! - Request logging
//! - Error and warning logging
//!
//! Every event is a structured `tracing` record: a severity, a message and
//! key/value fields.

pub mod writer;

use std::fmt::Display;
use std::net::SocketAddr;

use hyper::{Method, Version};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat, LoggingConfig};

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log level: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("logger already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Initialize the global subscriber with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };
    let make_writer = writer::make_writer(config.log_file.as_deref())?;
    let ansi = config.log_file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(make_writer))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(ansi).with_writer(make_writer))
            .try_init()?,
    }
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        addr = %addr,
        workers = ?config.server.workers,
        dsn = %config.database.dsn,
        static_dir = %config.http.static_dir,
        "starting server"
    );
}

pub fn log_database_ready(dsn: &str) {
    tracing::info!(dsn, "database connection pool ready");
}

pub fn log_request(ip: &str, proto: Version, method: &Method, uri: &str) {
    tracing::info!(ip, proto = ?proto, method = %method, uri, "received request");
}

/// Log an unexpected failure together with the request that hit it
pub fn log_server_error(error: &dyn Display, method: &Method, uri: &str, trace: &str) {
    tracing::error!(method = %method, uri, trace, "{error}");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_signal_received(signal: &str) {
    tracing::info!(signal, "shutdown signal received");
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!(active_connections, "shutting down");
}
