// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration, immutable once handed to the server
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port, 0 picks an ephemeral port
    pub port: u16,
    pub host: String,
    /// Skip the safety gate when binding a non-loopback host
    pub public: bool,
    /// Directory to serve
    pub pubdir: PathBuf,
    /// Don't log requests (errors are still logged)
    pub quiet: bool,
    /// Content type for files whose extension is unknown
    pub default_mime_type: Option<String>,
    /// File served in place of a directory listing
    pub index_filename: String,
    pub dirlist: DirlistOptions,
    /// Trickle file bodies out over a second
    pub emulate_slow_connection: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            host: DEFAULT_HOST.to_string(),
            public: false,
            pubdir: PathBuf::from("."),
            quiet: false,
            default_mime_type: None,
            index_filename: DEFAULT_INDEX_FILENAME.to_string(),
            dirlist: DirlistOptions::default(),
            emulate_slow_connection: false,
        }
    }
}

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_INDEX_FILENAME: &str = "index.html";

/// Directory listing options
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "DirlistSetting")]
pub struct DirlistOptions {
    /// Respond 404 instead of rendering a listing
    pub disable: bool,
    /// Include entries whose name starts with "."
    pub show_hidden: bool,
}

/// Accepted spellings of the `dirlist` key: a table, or a bare boolean
/// where `true` means "listing enabled".
#[derive(Deserialize)]
#[serde(untagged)]
enum DirlistSetting {
    Enabled(bool),
    Options {
        #[serde(default)]
        disable: bool,
        #[serde(default)]
        show_hidden: bool,
    },
}

impl From<DirlistSetting> for DirlistOptions {
    fn from(setting: DirlistSetting) -> Self {
        match setting {
            DirlistSetting::Enabled(enabled) => Self {
                disable: !enabled,
                show_hidden: false,
            },
            DirlistSetting::Options {
                disable,
                show_hidden,
            } => Self {
                disable,
                show_hidden,
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Access log format (default, combined, json)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log_format: "default".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}
