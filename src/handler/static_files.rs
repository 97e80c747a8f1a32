//! Static file serving module
//!
//! Serves files from one directory under the `/static/` prefix, with
//! content-derived `ETag`s and index files for directory paths. Directory
//! listings are never produced.

use std::path::{Path, PathBuf};

use hyper::header::HeaderMap;
use tokio::fs;

use crate::app::not_found;
use crate::http::etag::{etag_for, is_fresh};
use crate::http::mime::content_type_for;
use crate::http::{build_304_response, build_static_response, HttpResponse};
use crate::logger;

pub struct StaticFiles {
    root: PathBuf,
    index_files: Vec<String>,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_files: vec!["index.html".to_string()],
        }
    }

    /// Serve `relative` (the path after the prefix), honouring `If-None-Match`
    pub async fn serve(&self, relative: &str, headers: &HeaderMap) -> HttpResponse {
        let Some((content, content_type)) = self.load(relative).await else {
            return not_found();
        };

        let etag = etag_for(&content);
        if is_fresh(headers, &etag) {
            return build_304_response(&etag);
        }
        build_static_response(content, content_type, &etag)
    }

    async fn load(&self, relative: &str) -> Option<(Vec<u8>, &'static str)> {
        let root = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Static directory not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return None;
            }
        };

        let mut file_path = root.join(relative.trim_start_matches('/'));
        if relative.is_empty() || relative.ends_with('/') || is_dir(&file_path).await {
            file_path = self.find_index(&file_path).await?;
        }

        // A missing file is an ordinary 404
        let canonical = fs::canonicalize(&file_path).await.ok()?;
        if !canonical.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {relative} -> {}",
                canonical.display()
            ));
            return None;
        }

        match fs::read(&canonical).await {
            Ok(content) => Some((content, content_type_for(&canonical))),
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read file '{}': {e}",
                    canonical.display()
                ));
                None
            }
        }
    }

    async fn find_index(&self, dir: &Path) -> Option<PathBuf> {
        for name in &self.index_files {
            let candidate = dir.join(name);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                return Some(candidate);
            }
        }
        None
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}
