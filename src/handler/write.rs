//! Write endpoint
//!
//! `POST /path` stores the request body at the resolved path. Only reachable
//! on a loopback-bound server, and only from a loopback peer.

use super::chain::RequestContext;
use super::path::ResolvedPath;
use crate::error::ServeError;
use crate::http::{self, ResponseBody};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use hyper::{Response, StatusCode};
use std::io;
use std::net::SocketAddr;
use tokio::fs;

/// Create or replace the file at `resolved` with the request body
pub async fn handle_write(
    ctx: &mut RequestContext,
    resolved: &ResolvedPath,
) -> Result<Response<ResponseBody>, ServeError> {
    if !is_loopback_peer(&ctx.peer) {
        return Ok(http::build_text_response(StatusCode::FORBIDDEN, "Forbidden"));
    }

    let origin = ctx.headers.get(ORIGIN).cloned();
    let (existing, body) = tokio::join!(fs::metadata(&resolved.fs_path), ctx.read_body());
    let body = body?;

    let existed = match existing {
        Ok(meta) if meta.is_dir() => {
            return Ok(with_origin(
                http::build_text_response(StatusCode::CONFLICT, "Conflict: Directory exists at path"),
                origin,
            ));
        }
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(ServeError::io("stat", &resolved.fs_path, e)),
    };

    fs::write(&resolved.fs_path, &body)
        .await
        .map_err(|e| ServeError::io("write", &resolved.fs_path, e))?;

    let response = if existed {
        http::build_text_response(StatusCode::OK, "File replaced")
    } else {
        http::build_text_response(StatusCode::CREATED, "File created")
    };
    Ok(with_origin(response, origin))
}

/// True for 127.0.0.0/8, `::1` and IPv4-mapped loopback peers
pub fn is_loopback_peer(peer: &SocketAddr) -> bool {
    peer.ip().to_canonical().is_loopback()
}

fn with_origin(
    mut response: Response<ResponseBody>,
    origin: Option<HeaderValue>,
) -> Response<ResponseBody> {
    if let Some(origin) = origin {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    response
}
