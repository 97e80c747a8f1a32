//! HTTP response building module
//!
//! Builders for the handful of response shapes the server produces.
//! A builder never panics: if assembling the response fails it logs and
//! falls back to a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LOCATION, X_CONTENT_TYPE_OPTIONS,
};
use hyper::{Response, StatusCode};

use super::HttpResponse;

/// Build plain-text response, the shape of every error page
pub fn build_text_response(status: StatusCode, text: &str) -> HttpResponse {
    let body = format!("{text}\n");
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status)
        })
}

/// Build rendered page response
pub fn build_html_response(status: StatusCode, html: String) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, html.len())
        .body(Full::new(Bytes::from(html)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status)
        })
}

/// Build 303 See Other response, used after a successful form post
pub fn build_see_other_response(location: &str) -> HttpResponse {
    let status = StatusCode::SEE_OTHER;
    Response::builder()
        .status(status)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status)
        })
}

/// Build static file response with `ETag`
pub fn build_static_response(data: Vec<u8>, content_type: &str, etag: &str) -> HttpResponse {
    let status = StatusCode::OK;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, data.len())
        .header(ETAG, etag)
        .header(CACHE_CONTROL, "public, max-age=3600")
        .body(Full::new(Bytes::from(data)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status)
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> HttpResponse {
    let status = StatusCode::NOT_MODIFIED;
    Response::builder()
        .status(status)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, "public, max-age=3600")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(status)
        })
}

fn fallback(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
