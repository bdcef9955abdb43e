//! Serve a local directory over HTTP.
//!
//! GET and HEAD return files, index pages and generated directory listings.
//! A server bound to loopback additionally accepts `POST /path` to create or
//! replace files. Binding anywhere else is refused unless the served
//! directory sits inside the user's home (or `public` is set).

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod safety;
pub mod server;

pub use config::{AppState, Config, DirlistOptions, LoggingConfig, ServerConfig};
pub use error::{PathError, ServeError, StartupError};
pub use server::Server;
