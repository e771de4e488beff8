// Connection handling module
// Accepts TCP connections and serves HTTP/1.1 on them

use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;

use crate::config::AppState;
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry};

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Serve a single connection in its own local task.
///
/// Requests on the connection are handled one after another; requests on different
/// connections interleave on the event loop, so a slow transfer only holds up its
/// own connection.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { serve_request(req, peer_addr, &state).await }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Dispatch one request and write its access log line
async fn serve_request(
    req: Request<Incoming>,
    peer_addr: std::net::SocketAddr,
    state: &AppState,
) -> Result<Response<ResponseBody>, Infallible> {
    if !state.config.logging.access_log {
        return Ok(state.dispatcher.handle(req).await);
    }

    let started = Instant::now();
    let mut entry = AccessLogEntry::from_request(&req, &peer_addr);

    let descriptor = state.dispatcher.dispatch(req).await;
    entry.status = descriptor.status.as_u16();
    entry.body_bytes = descriptor.body.known_len();
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, &state.config.logging.access_log_format);

    Ok(descriptor.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::RootDir;
    use crate::server::create_listener;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_connection_over_limit_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path().join("none").to_str().unwrap()).unwrap();
        config.performance.max_connections = Some(1);
        let state = Arc::new(AppState::new(config, RootDir::new(dir.path()).unwrap()));
        state.active_connections.store(1, Ordering::SeqCst);

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let mut client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer_addr) = listener.accept().await.unwrap();

        accept_connection(stream, peer_addr, &state);
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 1);

        // Closed without a response
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
    }
}
