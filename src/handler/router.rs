//! Request routing dispatch module
//!
//! Maps method and path to a handler. HEAD is routed like GET; hyper drops
//! the body on the way out. Anything unmatched is a 404.

use std::sync::Arc;

use hyper::{Method, StatusCode};

use super::snippets;
use super::static_files::StaticFiles;
use crate::app::{client_error, not_found, Application};
use crate::http::{BodyRejection, HttpRequest, HttpResponse};
use crate::middleware::{BoxFuture, Endpoint};

const STATIC_PREFIX: &str = "/static/";

/// A matched route, borrowing its path parameter from the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    SnippetView(&'a str),
    SnippetCreate,
    SnippetCreatePost,
    /// Path below the static prefix
    Static(&'a str),
}

/// Match a request line against the route table
pub fn resolve<'a>(method: &Method, path: &'a str) -> Option<Route<'a>> {
    let readable = *method == Method::GET || *method == Method::HEAD;

    if readable {
        if path == "/" {
            return Some(Route::Home);
        }
        if path == "/snippet/create" {
            return Some(Route::SnippetCreate);
        }
        if let Some(id) = path.strip_prefix("/snippet/view/") {
            // One non-empty segment
            return (!id.is_empty() && !id.contains('/')).then_some(Route::SnippetView(id));
        }
        if let Some(rest) = path.strip_prefix(STATIC_PREFIX) {
            return Some(Route::Static(rest));
        }
        return None;
    }

    (*method == Method::POST && path == "/snippet/create").then_some(Route::SnippetCreatePost)
}

/// Chain endpoint dispatching to the snippet handlers and static files
pub struct Router {
    app: Arc<Application>,
    static_files: StaticFiles,
}

impl Router {
    pub const fn new(app: Arc<Application>, static_files: StaticFiles) -> Self {
        Self { app, static_files }
    }

    async fn dispatch(&self, req: HttpRequest) -> HttpResponse {
        if let Some(rejection) = req.extensions().get::<BodyRejection>() {
            return match rejection {
                BodyRejection::TooLarge => client_error(StatusCode::PAYLOAD_TOO_LARGE),
                BodyRejection::Unreadable => client_error(StatusCode::BAD_REQUEST),
            };
        }

        let app = self.app.as_ref();
        match resolve(req.method(), req.uri().path()) {
            Some(Route::Home) => snippets::home(app, &req).await,
            Some(Route::SnippetView(id)) => snippets::snippet_view(app, &req, id).await,
            Some(Route::SnippetCreate) => snippets::snippet_create(app, &req),
            Some(Route::SnippetCreatePost) => snippets::snippet_create_post(app, &req).await,
            Some(Route::Static(path)) => self.static_files.serve(path, req.headers()).await,
            None => not_found(),
        }
    }
}

impl Endpoint for Router {
    fn call(&self, req: HttpRequest) -> BoxFuture<'_, HttpResponse> {
        Box::pin(self.dispatch(req))
    }
}
