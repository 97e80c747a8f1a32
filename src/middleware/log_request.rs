// Request logging middleware

use super::{BoxFuture, Middleware, Next};
use crate::http::{request_uri, ClientAddr, HttpRequest, HttpResponse};
use crate::logger;

/// Logs one record per request before passing it on
pub struct LogRequest;

impl Middleware for LogRequest {
    fn handle<'a>(&'a self, req: HttpRequest, next: Next<'a>) -> BoxFuture<'a, HttpResponse> {
        let ip = req
            .extensions()
            .get::<ClientAddr>()
            .map_or_else(|| "-".to_string(), |addr| addr.0.ip().to_string());
        logger::log_request(&ip, req.version(), req.method(), request_uri(req.uri()));
        next.run(req)
    }
}
