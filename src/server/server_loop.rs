// Server loop module
// Accepts connections until shutdown is requested

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};
use tokio::task::JoinSet;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long open connections get to finish once the accept loop has stopped
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Accept connections until `shutdown` fires, then drain them
///
/// Accept errors (e.g. file descriptor exhaustion) are logged and the loop
/// carries on. On shutdown every connection finishes the request it is
/// serving and closes; connections still open after [`SHUTDOWN_GRACE`] are
/// aborted.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) {
    let mut connections = JoinSet::new();
    let (closing_tx, closing) = watch::channel(false);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &mut connections, &closing);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = finished {
                    logger::log_error(&format!("Connection task failed: {e}"));
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_server_stop(connections.len());
    let _ = closing_tx.send(true);

    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        logger::log_warning(&format!(
            "{} connection(s) still open after {} seconds, aborting",
            connections.len(),
            SHUTDOWN_GRACE.as_secs()
        ));
        connections.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::cube::facelets::SOLVED;
    use crate::server::create_listener;
    use crate::solver::stub::StubSolver;
    #[cfg(unix)]
    use crate::solver::ProcessSolver;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn solve_request() -> String {
        let body = format!(r#"{{"cubeState":"{SOLVED}"}}"#);
        format!(
            "POST /solve HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Serve on an ephemeral port with a shell script standing in for the solver
    #[cfg(unix)]
    fn serve_with_script(
        script: &str,
        solver_timeout: Option<Duration>,
        read_timeout: u64,
    ) -> (std::net::SocketAddr, Arc<Notify>, tokio::task::JoinHandle<()>) {
        let mut config = test_config();
        config.logging.access_log = false;
        config.performance.read_timeout = read_timeout;
        let solver = ProcessSolver::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "solver".to_string()],
            solver_timeout,
        );
        let state = Arc::new(AppState::with_solver(&config, Arc::new(solver)));
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(start_server_loop(listener, state, Arc::clone(&shutdown)));
        (addr, shutdown, server)
    }

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_solve_over_tcp_and_shuts_down() {
        let mut config = test_config();
        config.logging.access_log = false;
        let state = Arc::new(AppState::with_solver(
            &config,
            Arc::new(StubSolver::solving("F2 B'")),
        ));
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(start_server_loop(listener, state, Arc::clone(&shutdown)));

        let response = raw_request(addr, &solve_request()).await;

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("access-control-allow-origin: *"));
        assert!(response.ends_with(r#"{"solution":"F2 B'"}"#));

        shutdown.notify_one();
        server.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_solver_timeout_outlasts_read_timeout() {
        // The solve takes longer than read_timeout but must still be answered
        let (addr, shutdown, server) =
            serve_with_script("sleep 5", Some(Duration::from_millis(1500)), 1);

        let response = raw_request(addr, &solve_request()).await;

        assert!(response.starts_with("HTTP/1.1 400"), "{response}");
        assert!(response.contains("access-control-allow-origin: *"));
        assert!(response.ends_with(r#"{"error":"Solver did not finish within 1500 ms"}"#));

        shutdown.notify_one();
        server.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shutdown_finishes_request_in_flight() {
        let (addr, shutdown, server) = serve_with_script("sleep 1; echo R", None, 30);

        let client = tokio::spawn(async move { raw_request(addr, &solve_request()).await });
        // Let the request reach the solver before stopping
        tokio::time::sleep(Duration::from_millis(300)).await;
        shutdown.notify_one();
        server.await.unwrap();

        let response = client.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.ends_with(r#"{"solution":"R"}"#));
    }
}
