//! HTML views.
//!
//! Pages are [maud](https://maud.lambda.xyz/) functions registered under a
//! page name. All dynamic values are escaped by maud.

mod pages;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use maud::Markup;

use crate::models::Snippet;

/// Dynamic data handed to a page.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("the template {0} does not exist")]
    UnknownPage(String),
}

type PageFn = fn(&TemplateData) -> Markup;

/// Page registry, built once at startup.
pub struct TemplateCache {
    pages: HashMap<&'static str, PageFn>,
}

impl TemplateCache {
    pub fn new() -> Self {
        let mut registry: HashMap<&'static str, PageFn> = HashMap::new();
        registry.insert("home.tmpl", pages::home);
        registry.insert("view.tmpl", pages::view);
        registry.insert("create.tmpl", pages::create);
        Self { pages: registry }
    }

    /// Render a registered page to a complete HTML document
    pub fn render(&self, page: &str, data: &TemplateData) -> Result<String, TemplateError> {
        let view = self
            .pages
            .get(page)
            .ok_or_else(|| TemplateError::UnknownPage(page.to_string()))?;
        Ok(view(data).into_string())
    }

    pub fn contains(&self, page: &str) -> bool {
        self.pages.contains_key(page)
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a timestamp as `02 Jan 2006 at 15:04` (UTC)
pub fn human_date(t: DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}
