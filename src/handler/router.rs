//! Request routing dispatch module
//!
//! Terminal stage of the chain: resolves the request path and dispatches by
//! method. GET and HEAD read, POST writes, anything else is refused.

use super::chain::{Flow, RequestContext, Stage, StageFuture};
use super::{path, static_files, write};
use crate::config::AppState;
use crate::http;
use crate::logger;
use hyper::{Method, StatusCode};

pub struct Router;

impl Stage for Router {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext, state: &'a AppState) -> StageFuture<'a> {
        Box::pin(async move {
            let resolved = match path::resolve(&state.root, ctx.uri.path()) {
                Ok(resolved) => resolved,
                Err(e) => {
                    logger::log_warning(&format!("Rejected request path {}: {e}", ctx.uri));
                    return Ok(Flow::Respond(http::build_text_response(
                        StatusCode::BAD_REQUEST,
                        &format!("Bad request: {e}"),
                    )));
                }
            };

            let method = ctx.method.clone();
            let response = match method {
                Method::GET | Method::HEAD => static_files::serve(ctx, state, &resolved).await?,
                Method::POST if state.local_only => write::handle_write(ctx, &resolved).await?,
                Method::POST => http::build_text_response(StatusCode::FORBIDDEN, "Forbidden"),
                other => http::build_text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Unsupported method {other}"),
                ),
            };
            Ok(Flow::Respond(response))
        })
    }
}
