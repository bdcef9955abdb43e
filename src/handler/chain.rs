//! Handler chain
//!
//! Requests flow through an ordered list of stages sharing one interface.
//! A stage either passes the request on or produces the final response;
//! stages after the responding one never run. Once the response exists,
//! every stage that ran sees it, innermost first, right before the
//! response headers go out.

use crate::config::AppState;
use crate::error::ServeError;
use crate::http::{self, ResponseBody};
use crate::logger;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Uri, Version};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Request body as seen by the stages
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

pub type StageFuture<'a> = Pin<Box<dyn Future<Output = Result<Flow, ServeError>> + 'a>>;

/// Outcome of a single stage
pub enum Flow {
    /// Hand the request to the next stage
    Continue,
    /// Final response; later stages are skipped
    Respond(Response<ResponseBody>),
}

/// One step of request handling
pub trait Stage {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext, state: &'a AppState) -> StageFuture<'a>;

    /// Observe the final response just before its headers are sent
    fn on_response(&self, _ctx: &RequestContext, _response: &Response<ResponseBody>) {}
}

/// Per-request state, owned by the request's handler chain
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub peer: SocketAddr,
    body: Option<RequestBody>,
}

impl RequestContext {
    pub fn new<B>(req: Request<B>, peer: SocketAddr) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            peer,
            body: Some(body.map_err(Into::<BoxError>::into).boxed_unsync()),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    pub fn header_str(&self, name: impl hyper::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Buffer the whole request body. Later calls return an empty buffer.
    pub async fn read_body(&mut self) -> Result<Bytes, ServeError> {
        match self.body.take() {
            Some(body) => Ok(body.collect().await.map_err(ServeError::Body)?.to_bytes()),
            None => Ok(Bytes::new()),
        }
    }
}

/// Ordered stages composed into one request handler
#[derive(Default)]
pub struct Chain {
    stages: Vec<Box<dyn Stage>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the stages in order. Faults become a 500 response here, so a
    /// failing request never escapes the chain.
    pub async fn run(&self, ctx: &mut RequestContext, state: &AppState) -> Response<ResponseBody> {
        let mut ran = 0;
        let mut response = None;

        for stage in &self.stages {
            ran += 1;
            match stage.call(ctx, state).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Respond(res)) => {
                    response = Some(res);
                    break;
                }
                Err(err) => {
                    logger::log_internal_error(&err);
                    response = Some(http::build_500_response(&err));
                    break;
                }
            }
        }

        let response = response.unwrap_or_else(|| {
            http::build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("No handler for {} {}", ctx.method, ctx.uri.path()),
            )
        });

        for stage in self.stages[..ran].iter().rev() {
            stage.on_response(ctx, &response);
        }
        response
    }
}
