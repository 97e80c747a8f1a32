// Server module entry point
// Listener setup, the accept loop, per-connection service and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::atomic::AtomicUsize;

use crate::config::Config;
use crate::middleware::Chain;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
pub use signal::start_signal_handler;

/// State shared by every connection task
pub struct ServerState {
    pub config: Config,
    pub chain: Chain,
    pub active_connections: AtomicUsize,
}

impl ServerState {
    pub const fn new(config: Config, chain: Chain) -> Self {
        Self {
            config,
            chain,
            active_connections: AtomicUsize::new(0),
        }
    }
}
