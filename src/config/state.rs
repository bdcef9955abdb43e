// Application state module
// Values fixed at startup and shared read-only by every request

use std::path::PathBuf;

use super::types::ServerConfig;
use crate::logger::AccessLogFormat;

/// Per-server state handed to every handler stage
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Canonicalized served directory
    pub root: PathBuf,
    /// Bind host is loopback; enables the write endpoint
    pub local_only: bool,
    pub access_log_format: AccessLogFormat,
}

impl AppState {
    pub fn new(config: ServerConfig, root: PathBuf, local_only: bool) -> Self {
        Self {
            config,
            root,
            local_only,
            access_log_format: AccessLogFormat::default(),
        }
    }

    #[must_use]
    pub const fn with_access_log_format(mut self, format: AccessLogFormat) -> Self {
        self.access_log_format = format;
        self
    }
}
