//! Application context.
//!
//! `Application` carries the dependencies handlers need: the snippet store
//! and the page registry. It is built once in `main` and shared by reference;
//! nothing in the request path reaches for global state.

mod helpers;

use chrono::{Datelike, Utc};
use hyper::StatusCode;

use crate::http::{build_html_response, HttpRequest, HttpResponse};
use crate::models::SnippetModel;
use crate::templates::{TemplateCache, TemplateData};

pub use helpers::{client_error, not_found, server_error};

pub struct Application {
    pub snippets: SnippetModel,
    pub templates: TemplateCache,
}

impl Application {
    pub const fn new(snippets: SnippetModel, templates: TemplateCache) -> Self {
        Self {
            snippets,
            templates,
        }
    }

    /// Template data pre-filled with what every page shows
    pub fn new_template_data(&self) -> TemplateData {
        TemplateData {
            current_year: Utc::now().year(),
            ..TemplateData::default()
        }
    }

    /// Render a page into a buffer, then respond.
    ///
    /// Rendering completes before any status is chosen, so a missing page
    /// turns into a clean 500 rather than a half-written 200.
    pub fn render(
        &self,
        req: &HttpRequest,
        status: StatusCode,
        page: &str,
        data: &TemplateData,
    ) -> HttpResponse {
        match self.templates.render(page, data) {
            Ok(html) => build_html_response(status, html),
            Err(e) => server_error(req.method(), req.uri(), &e),
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_application() -> Application {
    Application::new(
        SnippetModel::new(crate::models::memory_pool().await),
        TemplateCache::new(),
    )
}
