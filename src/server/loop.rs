// Server loop module
// Accepts connections until shutdown is signalled, then waits for in-flight ones

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use super::ServerState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop.
///
/// Returns once `shutdown` is notified and the open connections have closed,
/// or `performance.shutdown_timeout` seconds have passed, whichever is first.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    // Stop taking new connections before waiting on the old ones
    drop(listener);

    logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));
    let timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    if !wait_for_drain(&state, timeout).await {
        logger::log_warning(&format!(
            "Shutdown timeout reached with {} connections still open",
            state.active_connections.load(Ordering::SeqCst)
        ));
    }
}

/// Wait until no connection is active. Returns false on timeout.
async fn wait_for_drain(state: &ServerState, timeout: Duration) -> bool {
    let drained = async {
        while state.active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, drained).await.is_ok()
}
