//! Request handler module
//!
//! Every request runs through one [`Chain`]: the access logger (unless the
//! server is quiet) followed by the method router.

pub mod access_log;
pub mod chain;
pub mod dirlist;
pub mod path;
pub mod router;
pub mod static_files;
pub mod write;

pub use access_log::AccessLogger;
pub use chain::{BoxError, Chain, Flow, RequestContext, Stage};
pub use router::Router;

use crate::config::AppState;
use crate::http::ResponseBody;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use std::net::SocketAddr;

/// Entry point for HTTP requests: shared state plus the composed chain
pub struct Dispatcher {
    state: AppState,
    chain: Chain,
}

impl Dispatcher {
    pub fn new(state: AppState) -> Self {
        let mut chain = Chain::new();
        if !state.config.quiet {
            chain = chain.with(AccessLogger::new(state.access_log_format));
        }
        let chain = chain.with(Router);
        Self { state, chain }
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle one request from `peer`; never fails, faults become 500s
    pub async fn dispatch<B>(&self, req: Request<B>, peer: SocketAddr) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let mut ctx = RequestContext::new(req, peer);
        self.chain.run(&mut ctx, &self.state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use http_body_util::{BodyExt, Empty, Full};
    use hyper::header::{CONTENT_TYPE, LOCATION};
    use hyper::StatusCode;
    use std::path::Path;

    const LOCAL_PEER: &str = "127.0.0.1:50000";

    fn dispatcher(root: &Path, local_only: bool) -> Dispatcher {
        let config = ServerConfig {
            quiet: true,
            ..ServerConfig::default()
        };
        Dispatcher::new(AppState::new(config, root.to_path_buf(), local_only))
    }

    fn scenario() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<p>docs</p>").unwrap();
        dir
    }

    async fn send(d: &Dispatcher, method: &str, target: &str) -> Response<ResponseBody> {
        let req = Request::builder()
            .method(method)
            .uri(target)
            .body(Empty::<Bytes>::new())
            .unwrap();
        d.dispatch(req, LOCAL_PEER.parse().unwrap()).await
    }

    async fn post(d: &Dispatcher, target: &str, body: &'static str, peer: &str) -> Response<ResponseBody> {
        let req = Request::post(target)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        d.dispatch(req, peer.parse().unwrap()).await
    }

    async fn body_string(res: Response<ResponseBody>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_quiet_skips_access_logger() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(dispatcher(dir.path(), true).chain.len(), 1);

        let state = AppState::new(ServerConfig::default(), dir.path().to_path_buf(), true);
        assert_eq!(Dispatcher::new(state).chain.len(), 2);
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = send(&d, "GET", "/a.txt").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_string(res).await, "hi");

        let res = send(&d, "GET", "/docs").await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[LOCATION], "/docs/");

        let res = send(&d, "GET", "/docs/").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "<p>docs</p>");

        let res = send(&d, "GET", "/missing").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_string(res).await.contains("/missing"));
    }

    #[tokio::test]
    async fn test_query_string_ignored() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = send(&d, "GET", "/a.txt?v=2").await;
        assert_eq!(body_string(res).await, "hi");
    }

    #[tokio::test]
    async fn test_traversal_stays_in_root() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        let d = dispatcher(&root, true);

        for target in ["/../secret.txt", "/%2e%2e/secret.txt", "/a/..%2f..%2fsecret.txt"] {
            let res = send(&d, "GET", target).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "target {target}");
            assert!(!body_string(res).await.contains("secret\n"));
        }
    }

    #[tokio::test]
    async fn test_malformed_escape_is_400() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = send(&d, "GET", "/bad%zzpath").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = send(&d, "DELETE", "/a.txt").await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(res).await, "Unsupported method DELETE\n");
        assert!(dir.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_post_roundtrip() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = post(&d, "/new.txt", "B", LOCAL_PEER).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = send(&d, "GET", "/new.txt").await;
        assert_eq!(body_string(res).await, "B");

        let res = post(&d, "/new.txt", "B2", LOCAL_PEER).await;
        assert_eq!(res.status(), StatusCode::OK);
        let res = send(&d, "GET", "/new.txt").await;
        assert_eq!(body_string(res).await, "B2");
    }

    #[tokio::test]
    async fn test_post_forbidden_when_public() {
        let dir = scenario();
        let d = dispatcher(dir.path(), false);

        let res = post(&d, "/new.txt", "B", LOCAL_PEER).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(!dir.path().join("new.txt").exists());
    }

    #[tokio::test]
    async fn test_post_forbidden_from_remote_peer() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = post(&d, "/a.txt", "overwritten", "192.168.1.20:50000").await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_write_fault_is_500() {
        let dir = scenario();
        let d = dispatcher(dir.path(), true);

        let res = post(&d, "/nope/deeper/file.txt", "x", LOCAL_PEER).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(res).await.starts_with("Internal server error: write"));

        let res = send(&d, "GET", "/a.txt").await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
