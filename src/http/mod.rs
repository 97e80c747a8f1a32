//! HTTP protocol layer module
//!
//! Request/response aliases, request extensions set by the connection layer,
//! response builders, MIME detection and entity tags. Nothing here knows
//! about snippets.

pub mod etag;
pub mod mime;
pub mod response;

use std::net::SocketAddr;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, Uri};

/// Request with its body already read into memory
pub type HttpRequest = Request<Bytes>;

pub type HttpResponse = Response<Full<Bytes>>;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_html_response, build_see_other_response, build_static_response,
    build_text_response,
};

/// Peer address of the connection a request arrived on
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub SocketAddr);

/// Set when the request body could not be read; the body is then empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRejection {
    /// Body exceeded `http.max_body_size`
    TooLarge,
    /// Client went away or sent a malformed body
    Unreadable,
}

/// Path plus query, as sent on the request line
pub fn request_uri(uri: &Uri) -> &str {
    uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str())
}
