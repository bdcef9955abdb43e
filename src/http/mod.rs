//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic:
//! content types, cache validators, response bodies and response builders.

pub mod body;
pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::{empty, full, ResponseBody, ThrottledBody};
pub use response::{
    build_404_response, build_500_response, build_html_response, build_redirect_response,
    build_text_response,
};
