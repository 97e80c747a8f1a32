//! Request handler module
//!
//! The route table, the snippet handlers and static files, assembled behind
//! the middleware chain every request passes through.

pub mod router;
pub mod snippets;
pub mod static_files;

use std::sync::Arc;

use crate::app::Application;
use crate::config::Config;
use crate::middleware::{Chain, LogRequest, RecoverPanic, SecureHeaders};

pub use router::{resolve, Route, Router};
pub use static_files::StaticFiles;

/// Build the full request pipeline:
/// panic recovery, request logging, security headers, then the router
pub fn routes(app: Arc<Application>, config: &Config) -> Chain {
    let router = Router::new(app, StaticFiles::new(&config.http.static_dir));

    Chain::new(router)
        .with(RecoverPanic)
        .with(LogRequest)
        .with(SecureHeaders::new(&config.http.server_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_application;
    use crate::http::{BodyRejection, HttpRequest, HttpResponse};
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::header::{
        CONTENT_SECURITY_POLICY, LOCATION, REFERRER_POLICY, SERVER, X_CONTENT_TYPE_OPTIONS,
        X_FRAME_OPTIONS, X_XSS_PROTECTION,
    };
    use hyper::{Request, StatusCode};

    struct Site {
        chain: Chain,
        app: Arc<Application>,
        _static_dir: tempfile::TempDir,
    }

    async fn site() -> Site {
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(static_dir.path().join("css")).unwrap();
        std::fs::write(static_dir.path().join("css/main.css"), "main {}").unwrap();

        let mut config = Config::defaults().unwrap();
        config.http.static_dir = static_dir.path().to_string_lossy().into_owned();

        let app = Arc::new(test_application().await);
        Site {
            chain: routes(Arc::clone(&app), &config),
            app,
            _static_dir: static_dir,
        }
    }

    fn get(path: &str) -> HttpRequest {
        Request::get(path).body(Bytes::new()).unwrap()
    }

    fn assert_secure(resp: &HttpResponse) {
        for name in [
            CONTENT_SECURITY_POLICY,
            REFERRER_POLICY,
            X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
            X_XSS_PROTECTION,
        ] {
            assert!(resp.headers().contains_key(&name), "missing {name:?}");
        }
        assert_eq!(resp.headers()[SERVER], "snippetbox");
    }

    async fn body_text(resp: HttpResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_every_route_has_security_headers() {
        let site = site().await;
        let id = site.app.snippets.insert("t", "c", 1).await.unwrap();

        let requests = vec![
            get("/"),
            get(&format!("/snippet/view/{id}")),
            get("/snippet/view/abc"),
            get("/snippet/view/404"),
            get("/snippet/create"),
            get("/static/css/main.css"),
            get("/static/missing.css"),
            get("/nowhere"),
            Request::post("/snippet/create")
                .body(Bytes::from_static(b"garbage"))
                .unwrap(),
            Request::delete("/").body(Bytes::new()).unwrap(),
        ];
        for req in requests {
            let path = req.uri().to_string();
            let resp = site.chain.handle(req).await;
            assert_secure(&resp);
            assert_ne!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        }
    }

    #[tokio::test]
    async fn test_view_status_codes() {
        let site = site().await;
        for path in ["/snippet/view/0", "/snippet/view/-5", "/snippet/view/abc"] {
            let resp = site.chain.handle(get(path)).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }

        let resp = site.chain.handle(get("/snippet/view/1")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        site.app
            .snippets
            .insert("O snail", "haiku text", 7)
            .await
            .unwrap();
        let resp = site.chain.handle(get("/snippet/view/1")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("haiku text"));
    }

    #[tokio::test]
    async fn test_create_then_view() {
        let site = site().await;
        let req = Request::post("/snippet/create")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Bytes::from_static(b"title=Hello&content=World&expires=365"))
            .unwrap();
        let resp = site.chain.handle(req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers()[LOCATION].to_str().unwrap().to_string();
        assert_eq!(location, "/snippet/view/1");

        let resp = site.chain.handle(get(&location)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("World"));
    }

    #[tokio::test]
    async fn test_unmatched_is_404() {
        let site = site().await;
        let requests = vec![
            get("/missing"),
            get("/snippet/craete"),
            Request::post("/").body(Bytes::new()).unwrap(),
            Request::put("/snippet/create").body(Bytes::new()).unwrap(),
        ];
        for req in requests {
            assert_eq!(site.chain.handle(req).await.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_head_routed_like_get() {
        let site = site().await;
        let req = Request::head("/snippet/create").body(Bytes::new()).unwrap();
        assert_eq!(site.chain.handle(req).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_file() {
        let site = site().await;
        let resp = site.chain.handle(get("/static/css/main.css")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "main {}");
    }

    #[tokio::test]
    async fn test_body_rejections() {
        let site = site().await;
        let mut req = Request::post("/snippet/create").body(Bytes::new()).unwrap();
        req.extensions_mut().insert(BodyRejection::TooLarge);
        let resp = site.chain.handle(req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_secure(&resp);

        let mut req = Request::post("/snippet/create").body(Bytes::new()).unwrap();
        req.extensions_mut().insert(BodyRejection::Unreadable);
        assert_eq!(site.chain.handle(req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_headers() {
        let site = site().await;
        sqlx::query("DROP TABLE snippets")
            .execute(site.app.snippets.pool())
            .await
            .unwrap();
        let resp = site.chain.handle(get("/")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_secure(&resp);
    }
}
