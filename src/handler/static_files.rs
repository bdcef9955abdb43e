//! Static file serving module
//!
//! Answers GET and HEAD for a resolved path: regular files with cache
//! validators, directories with their index file, a listing, or a redirect
//! that adds the trailing slash.

use super::chain::RequestContext;
use super::dirlist;
use super::path::ResolvedPath;
use crate::config::AppState;
use crate::error::ServeError;
use crate::http::{self, cache, mime, ResponseBody, ThrottledBody};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use hyper::{Response, StatusCode};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Number of chunks a throttled body is split into
pub const SLOW_CHUNK_COUNT: u32 = 100;

/// Time a throttled body takes from first to last chunk
pub const SLOW_TOTAL_DURATION: Duration = Duration::from_millis(1000);

/// Serve whatever lives at `resolved`
pub async fn serve(
    ctx: &RequestContext,
    state: &AppState,
    resolved: &ResolvedPath,
) -> Result<Response<ResponseBody>, ServeError> {
    let meta = match fs::metadata(&resolved.fs_path).await {
        Ok(meta) => meta,
        Err(e) if is_not_found(&e) => return Ok(http::build_404_response(&resolved.pathname)),
        Err(e) => return Err(ServeError::io("stat", &resolved.fs_path, e)),
    };

    if meta.is_file() {
        serve_file(ctx, state, &resolved.fs_path, &meta).await
    } else if meta.is_dir() {
        serve_dir(ctx, state, resolved).await
    } else {
        Ok(http::build_text_response(
            StatusCode::NOT_FOUND,
            &format!("404 not found {} (unreadable file type)", resolved.pathname),
        ))
    }
}

/// Serve a regular file from memory
pub async fn serve_file(
    ctx: &RequestContext,
    state: &AppState,
    file: &Path,
    meta: &Metadata,
) -> Result<Response<ResponseBody>, ServeError> {
    let content = fs::read(file)
        .await
        .map_err(|e| ServeError::io("read", file, e))?;

    let content_type =
        mime::content_type_for(file, state.config.default_mime_type.as_deref(), &content);
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(ETAG, cache::generate_etag(meta))
        .header(CONTENT_LENGTH, content.len());
    if let Ok(modified) = meta.modified() {
        builder = builder.header(LAST_MODIFIED, cache::http_date(modified));
    }

    let body = if ctx.is_head() {
        http::empty()
    } else if state.config.emulate_slow_connection {
        ThrottledBody::new(Bytes::from(content), SLOW_CHUNK_COUNT, SLOW_TOTAL_DURATION)
            .boxed_unsync()
    } else {
        http::full(content)
    };

    Ok(builder.body(body)?)
}

/// Serve a directory: trailing-slash redirect, index file, 404 or listing
pub async fn serve_dir(
    ctx: &RequestContext,
    state: &AppState,
    resolved: &ResolvedPath,
) -> Result<Response<ResponseBody>, ServeError> {
    let opts = state.config.dirlist;
    let index_file = resolved.fs_path.join(&state.config.index_filename);
    let index_meta = match fs::metadata(&index_file).await {
        Ok(meta) if meta.is_file() => Some(meta),
        Ok(_) => None,
        Err(e) if is_not_found(&e) => None,
        Err(e) => return Err(ServeError::io("stat", &index_file, e)),
    };

    // Relative links in both the index page and the listing need the slash
    if !resolved.has_trailing_slash() && (index_meta.is_some() || !opts.disable) {
        let location = dirlist::encode_href(&format!("{}/", resolved.pathname));
        return Ok(http::build_redirect_response(&location));
    }

    if let Some(meta) = index_meta {
        return serve_file(ctx, state, &index_file, &meta).await;
    }

    if opts.disable {
        return Ok(http::build_404_response(&resolved.pathname));
    }

    let html = dirlist::create_listing_html(&resolved.fs_path, &resolved.pathname, opts)
        .await
        .map_err(|e| ServeError::io("list", &resolved.fs_path, e))?;
    Ok(http::build_html_response(html, ctx.is_head()))
}

/// Missing entries, and paths running through a regular file, are both 404
fn is_not_found(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
