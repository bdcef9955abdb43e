//! Access log format module
//!
//! Supports:
//! - `default`: `addr [date] "METHOD /target HTTP/1.1" status user-agent`
//! - `combined` (Apache/Nginx combined format)
//! - `json` (one JSON object per line)

use chrono::{DateTime, Utc};
use serde_json::json;

/// Access log line layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessLogFormat {
    #[default]
    Default,
    Combined,
    Json,
}

impl AccessLogFormat {
    /// Parse a configured format name; unknown names are `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "combined" => Some(Self::Combined),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Access log entry containing request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Time the response headers were finalized
    pub time: DateTime<Utc>,
    pub method: String,
    /// Request target as sent by the client
    pub target: String,
    /// HTTP version (1.0, 1.1, 2.0)
    pub http_version: String,
    pub status: u16,
    /// Declared response body size, if known
    pub body_bytes: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, target: String) -> Self {
        Self {
            remote_addr,
            time: Utc::now(),
            method,
            target,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: None,
            referer: None,
            user_agent: None,
        }
    }

    pub fn format(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Default => self.format_default(),
            AccessLogFormat::Combined => self.format_combined(),
            AccessLogFormat::Json => self.format_json(),
        }
    }

    fn format_default(&self) -> String {
        format!(
            "{} [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.method,
            self.target,
            self.http_version,
            self.status,
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {} \"{}\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.target,
            self.http_version,
            self.status,
            self.body_bytes.map_or_else(|| "-".to_string(), |n| n.to_string()),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "target": self.target,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
        })
        .to_string()
    }
}
