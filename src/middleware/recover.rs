// Panic recovery middleware
// Turns a panic anywhere further in the chain into a 500 on a closing connection

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use hyper::header::{HeaderValue, CONNECTION};

use super::{BoxFuture, Middleware, Next};
use crate::app::server_error;
use crate::http::{HttpRequest, HttpResponse};

pub struct RecoverPanic;

impl Middleware for RecoverPanic {
    fn handle<'a>(&'a self, req: HttpRequest, next: Next<'a>) -> BoxFuture<'a, HttpResponse> {
        Box::pin(async move {
            let method = req.method().clone();
            let uri = req.uri().clone();

            // The call itself sits inside the guarded future so a panic raised
            // before the first poll is caught too
            let outcome = AssertUnwindSafe(async move { next.run(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(response) => response,
                Err(payload) => {
                    let message = format!("panic: {}", panic_message(payload.as_ref()));
                    let mut response = server_error(&method, &uri, &message);
                    // hyper stops reusing the connection once it sees this
                    response
                        .headers_mut()
                        .insert(CONNECTION, HeaderValue::from_static("close"));
                    response
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
