// Security headers middleware
// Headers are staged before the rest of the chain runs, so they reach every
// response, including the 500 produced for a recovered panic

use hyper::header::{
    HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY, SERVER,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};

use super::{BoxFuture, Middleware, Next, PendingHeaders};
use crate::http::{HttpRequest, HttpResponse};

const CSP: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

pub struct SecureHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecureHeaders {
    /// `server_name` becomes the `Server` header; an unusable value falls
    /// back to the crate name
    pub fn new(server_name: &str) -> Self {
        let server = HeaderValue::from_str(server_name)
            .unwrap_or_else(|_| HeaderValue::from_static(env!("CARGO_PKG_NAME")));
        Self {
            headers: vec![
                (CONTENT_SECURITY_POLICY, HeaderValue::from_static(CSP)),
                (
                    REFERRER_POLICY,
                    HeaderValue::from_static("origin-when-cross-origin"),
                ),
                (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
                (X_FRAME_OPTIONS, HeaderValue::from_static("deny")),
                (X_XSS_PROTECTION, HeaderValue::from_static("0")),
                (SERVER, server),
            ],
        }
    }
}

impl Middleware for SecureHeaders {
    fn handle<'a>(&'a self, req: HttpRequest, next: Next<'a>) -> BoxFuture<'a, HttpResponse> {
        if let Some(pending) = req.extensions().get::<PendingHeaders>() {
            for (name, value) in &self.headers {
                pending.insert(name.clone(), value.clone());
            }
            return next.run(req);
        }

        // Running outside a Chain: set them on the way out instead
        Box::pin(async move {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            for (name, value) in &self.headers {
                headers.insert(name.clone(), value.clone());
            }
            response
        })
    }
}
