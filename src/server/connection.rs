// Connection handling module
// Accepts a single TCP connection and serves HTTP/1.1 on it

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `connections` - Task set the connection is served on
/// * `closing` - Flips to `true` when the server stops
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    connections: &mut JoinSet<()>,
    closing: &watch::Receiver<bool>,
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

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY for {peer_addr}: {e}"));
    }

    connections.spawn(handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        closing.clone(),
    ));
}

/// Serve one connection until the client leaves or the server closes.
///
/// `read_timeout` bounds header reads, idle keep-alive included (0 keeps
/// hyper's default); a request being handled is never cut off. On close, the request in flight is
/// finished before the connection shuts. The connection counter is released
/// when the task ends.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    mut closing: watch::Receiver<bool>,
) {
    let io = TokioIo::new(stream);
    let perf = &state.config.performance;

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(perf.keep_alive_timeout > 0)
        .timer(TokioTimer::new());
    if perf.read_timeout > 0 {
        builder.header_read_timeout(Duration::from_secs(perf.read_timeout));
    }

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );
    tokio::pin!(conn);

    let served = tokio::select! {
        served = conn.as_mut() => served,
        _ = closing.changed() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(err) = served {
        if err.is_timeout() {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                perf.read_timeout
            ));
        } else {
            logger::log_connection_error(&err);
        }
    }

    state.active_connections.fetch_sub(1, Ordering::SeqCst);
}
