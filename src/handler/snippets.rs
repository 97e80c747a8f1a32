//! Snippet handlers
//!
//! Each handler parses its input, calls the store and renders or redirects.
//! Store failures other than a missing snippet end the request with a 500.

use hyper::StatusCode;
use serde::Deserialize;

use crate::app::{client_error, not_found, server_error, Application};
use crate::http::{build_see_other_response, HttpRequest, HttpResponse};
use crate::models::StoreError;

/// Fields posted by the create form
#[derive(Debug, Deserialize)]
struct SnippetForm {
    title: String,
    content: String,
    /// Days until expiry
    expires: u32,
}

pub async fn home(app: &Application, req: &HttpRequest) -> HttpResponse {
    let snippets = match app.snippets.latest().await {
        Ok(snippets) => snippets,
        Err(e) => return server_error(req.method(), req.uri(), &e),
    };

    let mut data = app.new_template_data();
    data.snippets = snippets;
    app.render(req, StatusCode::OK, "home.tmpl", &data)
}

pub async fn snippet_view(app: &Application, req: &HttpRequest, raw_id: &str) -> HttpResponse {
    // Malformed and unknown ids look the same to the client
    let Some(id) = parse_id(raw_id) else {
        return not_found();
    };

    let snippet = match app.snippets.get(id).await {
        Ok(snippet) => snippet,
        Err(StoreError::NotFound) => return not_found(),
        Err(e) => return server_error(req.method(), req.uri(), &e),
    };

    let mut data = app.new_template_data();
    data.snippet = Some(snippet);
    app.render(req, StatusCode::OK, "view.tmpl", &data)
}

pub fn snippet_create(app: &Application, req: &HttpRequest) -> HttpResponse {
    let data = app.new_template_data();
    app.render(req, StatusCode::OK, "create.tmpl", &data)
}

pub async fn snippet_create_post(app: &Application, req: &HttpRequest) -> HttpResponse {
    let form: SnippetForm = match serde_urlencoded::from_bytes(req.body()) {
        Ok(form) => form,
        Err(_) => return client_error(StatusCode::BAD_REQUEST),
    };
    if form.expires == 0 {
        return client_error(StatusCode::BAD_REQUEST);
    }

    match app
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await
    {
        Ok(id) => build_see_other_response(&format!("/snippet/view/{id}")),
        Err(e) => server_error(req.method(), req.uri(), &e),
    }
}

/// Positive integer id, or `None`
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}
