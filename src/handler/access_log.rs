//! Access logging stage
//!
//! Passes every request through and writes one access log line once the
//! final response is known.

use super::chain::{Flow, RequestContext, Stage, StageFuture};
use crate::config::AppState;
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry, AccessLogFormat};
use hyper::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Response, Version};

pub struct AccessLogger {
    format: AccessLogFormat,
}

impl AccessLogger {
    pub const fn new(format: AccessLogFormat) -> Self {
        Self { format }
    }
}

impl Stage for AccessLogger {
    fn call<'a>(&'a self, _ctx: &'a mut RequestContext, _state: &'a AppState) -> StageFuture<'a> {
        Box::pin(async { Ok(Flow::Continue) })
    }

    fn on_response(&self, ctx: &RequestContext, response: &Response<ResponseBody>) {
        logger::log_access(&build_entry(ctx, response), self.format);
    }
}

pub fn build_entry(ctx: &RequestContext, response: &Response<ResponseBody>) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        ctx.peer.ip().to_canonical().to_string(),
        ctx.method.to_string(),
        ctx.uri.to_string(),
    );
    entry.http_version = version_str(ctx.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.referer = ctx.header_str(REFERER).map(ToString::to_string);
    entry.user_agent = ctx.header_str(USER_AGENT).map(ToString::to_string);
    entry
}

const fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http;
    use http_body_util::Empty;
    use hyper::body::Bytes;
    use hyper::{Request, StatusCode};

    #[test]
    fn test_entry_from_exchange() {
        let req = Request::get("/docs/a.txt?x=1")
            .version(Version::HTTP_10)
            .header(USER_AGENT, "curl/8.0")
            .header(REFERER, "http://localhost/")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let ctx = RequestContext::new(req, "[::ffff:127.0.0.1]:40000".parse().unwrap());
        let res = http::build_404_response("/docs/a.txt");

        let entry = build_entry(&ctx, &res);
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.target, "/docs/a.txt?x=1");
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.status, 404);
        assert_eq!(entry.body_bytes, Some("404 not found /docs/a.txt\n".len() as u64));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.referer.as_deref(), Some("http://localhost/"));
    }

    #[test]
    fn test_entry_without_optional_headers() {
        let req = Request::head("/").body(Empty::<Bytes>::new()).unwrap();
        let ctx = RequestContext::new(req, "10.0.0.2:1234".parse().unwrap());
        let res = http::build_text_response(StatusCode::OK, "ok");

        let entry = build_entry(&ctx, &res);
        assert_eq!(entry.remote_addr, "10.0.0.2");
        assert_eq!(entry.http_version, "1.1");
        assert!(entry.user_agent.is_none());
        assert!(entry.referer.is_none());
    }
}
