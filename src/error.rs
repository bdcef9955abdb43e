//! Error types
//!
//! Startup errors abort the process before any connection is accepted.
//! Serve errors are per-request and end up as a 500 response.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems detected before the listener starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Directory {} does not exist", .0.display())]
    PubdirMissing(PathBuf),

    #[error("Failed to resolve directory {}: {}", .0.display(), .1)]
    PubdirUnreadable(PathBuf, #[source] io::Error),

    #[error(
        "Refusing to allow external connections for security reasons:\n  {0}.\n  Set --public to ignore this safeguard. Please be careful."
    )]
    UnsafePubdir(String),

    #[error("Invalid bind address {host}:{port}: {reason}")]
    InvalidHost {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to open log file: {0}")]
    Logger(#[source] io::Error),
}

/// Faults raised while handling a single request.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read request body: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}

impl ServeError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Request targets that cannot be turned into a pathname.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("malformed percent-escape in {0}")]
    MalformedEscape(String),

    #[error("request path is not valid UTF-8")]
    InvalidUtf8,

    #[error("request path contains a NUL byte")]
    NulByte,
}
