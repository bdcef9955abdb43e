// Configuration module entry point
// Loads layered configuration (defaults, TOML file, environment)

mod state;
mod types;

use std::net::IpAddr;
use std::path::Path;

pub use state::AppState;
pub use types::{
    Config, DirlistOptions, LoggingConfig, ServerConfig, DEFAULT_HOST, DEFAULT_INDEX_FILENAME,
};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_NAME: &str = "servedir";

/// Prefix for environment overrides, e.g. `SERVEDIR_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "SERVEDIR";

/// Address bound when the server is public and no explicit host was given
pub const ALL_INTERFACES: &str = "0.0.0.0";

impl Config {
    /// Load configuration from the given file, or from the optional
    /// `servedir.toml` in the working directory, then apply environment overrides.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match config_path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Parse configuration from a TOML document, without file or environment lookup
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

impl ServerConfig {
    /// Host the listener binds to.
    ///
    /// A public server left on the default host listens on every interface.
    pub fn bind_host(&self) -> &str {
        if self.host.is_empty() || (self.public && self.host == DEFAULT_HOST) {
            ALL_INTERFACES
        } else {
            &self.host
        }
    }

    /// True when the bind host only accepts connections from this machine
    pub fn is_local_only(&self) -> bool {
        is_loopback_host(self.bind_host())
    }
}

/// Whether `host` names the loopback interface (`localhost`, `127.0.0.1`, `::1`, ...)
pub fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    bare.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}
