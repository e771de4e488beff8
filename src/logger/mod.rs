//! Logger module
//!
//! Thin layer over `tracing` providing:
//! - Subscriber setup (level, access log and error log destinations)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::config::{Config, LoggingConfig};
use crate::error::RequestError;
use crate::handler::Dispatcher;
use writer::LogTarget;

/// Target of access log events; routed to the access log output only
pub const ACCESS_TARGET: &str = "fileshare::access";

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` overrides the configured
/// level; `verbose` forces debug output.
pub fn init(logging: &LoggingConfig, verbose: bool) -> io::Result<()> {
    let filter = if verbose {
        EnvFilter::try_new("fileshare=debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(format!("fileshare={}", logging.level)))
    }
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid log level: {e}")))?;
    let access_off = format!("{ACCESS_TARGET}=off")
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{e}")))?;
    let filter = filter.add_directive(access_off);

    let error_target = LogTarget::open(logging.error_log_file.as_deref(), LogTarget::Stderr)?;
    let access_target = LogTarget::open(logging.access_log_file.as_deref(), LogTarget::Stdout)?;

    let main_layer = fmt::layer()
        .with_ansi(error_target.is_terminal_stream())
        .with_writer(error_target.into_make_writer())
        .with_filter(filter);

    let access_layer = fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_writer(access_target.into_make_writer())
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    tracing_subscriber::registry()
        .with(main_layer)
        .with(access_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, dispatcher: &Dispatcher, config: &Config) {
    info!("File server now listening on port {}.", addr.port());
    info!("Listening on: http://{addr}");
    info!("Serving files from: {}", dispatcher.root().path().display());
    info!("Methods: {}", dispatcher.methods().methods().join(", "));
    info!("Log level: {}", config.logging.level);
    if let Some(ref path) = config.logging.access_log_file {
        info!("Access log: {path}");
    }
    if let Some(ref path) = config.logging.error_log_file {
        info!("Error log: {path}");
    }
    if let Some(limit) = config.http.max_body_size {
        info!("Max upload size: {limit} bytes");
    }
    if let Some(limit) = config.performance.max_connections {
        info!("Max connections: {limit}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    debug!("Connection accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    warn!("Failed to serve connection: {err}");
}

pub fn log_error(message: &str) {
    error!("{message}");
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}

/// Request refused with an explicit status (403, 404, 405, 413)
pub fn log_request_rejected(status: StatusCode, err: &RequestError) {
    debug!(status = status.as_u16(), "Request rejected: {err}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown(signal: &str) {
    info!("{signal} received, shutting down");
}
