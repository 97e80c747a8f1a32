// Connection handling module
// Accepts a TCP connection and serves it with hyper in its own task

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;

use super::ServerState;
use crate::http::{BodyRejection, ClientAddr, HttpResponse};
use crate::logger;

/// Accept a connection unless the connection cap is reached.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared server state
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<ServerState>,
) {
    // Increment first, then check, so two racing accepts cannot both slip in
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Serve one connection in a spawned task.
///
/// The whole connection, keep-alive included, is bounded by the larger of
/// the read and write timeouts. The connection counter is released when the
/// task ends.
fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<ServerState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { Ok::<_, Infallible>(serve_request(req, peer_addr, &state).await) }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            )),
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Read the body up to `http.max_body_size`, tag the request with its peer
/// address and run it through the chain.
///
/// A body that cannot be read is replaced by an empty one and the reason is
/// attached as a [`BodyRejection`] for the router to answer.
pub async fn serve_request<B>(req: Request<B>, peer_addr: SocketAddr, state: &ServerState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    let (bytes, rejection) = match Limited::new(body, limit).collect().await {
        Ok(collected) => (collected.to_bytes(), None),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            (Bytes::new(), Some(BodyRejection::TooLarge))
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body from {peer_addr}: {e}"));
            (Bytes::new(), Some(BodyRejection::Unreadable))
        }
    };

    let mut req = Request::from_parts(parts, bytes);
    req.extensions_mut().insert(ClientAddr(peer_addr));
    if let Some(rejection) = rejection {
        req.extensions_mut().insert(rejection);
    }

    state.chain.handle(req).await
}
