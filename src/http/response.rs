//! HTTP response building module
//!
//! Provides builders for the fixed-shape responses the server emits.

use super::body::{empty, full, ResponseBody};
use super::cache::EXPIRED;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, EXPIRES, LOCATION};
use hyper::{Response, StatusCode};

/// Build a short plain-text response; the body is the trimmed message plus a newline
pub fn build_text_response(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let body = format!("{}\n", message.trim());
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, body.len())
        .body(full(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full(body))
        })
}

/// Build 404 Not Found response echoing the requested pathname
pub fn build_404_response(pathname: &str) -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, &format!("404 not found {pathname}"))
}

/// Build 500 Internal Server Error response
pub fn build_500_response(error: &dyn std::fmt::Display) -> Response<ResponseBody> {
    build_text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Internal server error: {error}"),
    )
}

/// Build 303 See Other response, already expired so it is never cached
pub fn build_redirect_response(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(EXPIRES, EXPIRED)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("303", &e);
            build_text_response(StatusCode::BAD_REQUEST, "Invalid redirect location")
        })
}

/// Build a generated HTML page response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(StatusCode::OK)
        .header(EXPIRES, EXPIRED)
        .header(CONTENT_TYPE, "text/html")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
