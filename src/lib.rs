//! Snippetbox: share and view short text snippets over HTTP.
//!
//! The binary in `main.rs` wires these modules together; tests use them
//! directly.

pub mod app;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod models;
pub mod server;
pub mod templates;
