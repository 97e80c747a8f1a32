// Error response helpers
// Server errors are logged with full context; client errors are not logged

use std::backtrace::Backtrace;
use std::fmt::Display;

use hyper::{Method, StatusCode, Uri};

use crate::http::{build_text_response, request_uri, HttpResponse};
use crate::logger;

/// Log an unexpected failure with the request line and a stack trace, then
/// answer with a bare 500. No detail of the failure reaches the client.
pub fn server_error(method: &Method, uri: &Uri, err: &dyn Display) -> HttpResponse {
    let trace = Backtrace::force_capture().to_string();
    logger::log_server_error(err, method, request_uri(uri), &trace);
    client_error(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Answer with `status` and its reason phrase as the body
pub fn client_error(status: StatusCode) -> HttpResponse {
    build_text_response(status, status.canonical_reason().unwrap_or("Unknown Status"))
}

pub fn not_found() -> HttpResponse {
    client_error(StatusCode::NOT_FOUND)
}
