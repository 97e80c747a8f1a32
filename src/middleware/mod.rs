//! Request interceptors.
//!
//! A [`Chain`] is an ordered list of [`Middleware`] in front of one
//! [`Endpoint`]. Each middleware receives the request and a [`Next`] handle
//! for the rest of the chain; it may act before and after calling it, or
//! answer on its own. The first middleware added is the outermost.
//!
//! Methods return boxed futures for dyn compatibility.

mod headers;
mod log_request;
mod recover;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

use crate::http::{HttpRequest, HttpResponse};

pub use headers::SecureHeaders;
pub use log_request::LogRequest;
pub use recover::RecoverPanic;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Innermost request handler of a chain
pub trait Endpoint: Send + Sync {
    fn call(&self, req: HttpRequest) -> BoxFuture<'_, HttpResponse>;
}

/// A single interceptor
pub trait Middleware: Send + Sync {
    fn handle<'a>(&'a self, req: HttpRequest, next: Next<'a>) -> BoxFuture<'a, HttpResponse>;
}

/// The remainder of a chain, from the current middleware's point of view
#[derive(Clone, Copy)]
pub struct Next<'a> {
    middleware: &'a [Box<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Pass the request to the next middleware, or the endpoint
    pub fn run(self, req: HttpRequest) -> BoxFuture<'a, HttpResponse> {
        match self.middleware.split_first() {
            Some((current, rest)) => current.handle(
                req,
                Next {
                    middleware: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.call(req),
        }
    }
}

/// Headers a middleware sets before the response exists.
///
/// The chain puts one of these in every request's extensions and copies
/// its headers onto whatever response comes back, including one produced
/// after a panic further in. A header the response already has wins.
#[derive(Clone, Default)]
pub struct PendingHeaders(Arc<Mutex<HeaderMap>>);

impl PendingHeaders {
    pub fn insert(&self, name: HeaderName, value: HeaderValue) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub fn apply_to(&self, headers: &mut HeaderMap) {
        let pending = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        for (name, value) in pending.iter() {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
    }
}

pub struct Chain {
    middleware: Vec<Box<dyn Middleware>>,
    endpoint: Box<dyn Endpoint>,
}

impl Chain {
    pub fn new(endpoint: impl Endpoint + 'static) -> Self {
        Self {
            middleware: Vec::new(),
            endpoint: Box::new(endpoint),
        }
    }

    /// Append a middleware inside those already added
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Run a request through every middleware and the endpoint
    pub async fn handle(&self, mut req: HttpRequest) -> HttpResponse {
        let pending = PendingHeaders::default();
        req.extensions_mut().insert(pending.clone());

        let next = Next {
            middleware: &self.middleware,
            endpoint: self.endpoint.as_ref(),
        };
        let mut response = next.run(req).await;

        pending.apply_to(response.headers_mut());
        response
    }
}
