// Server module entry point
// Startup checks, binding, and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tokio::net::TcpListener;

use crate::config::{AppState, ServerConfig};
use crate::error::StartupError;
use crate::handler::Dispatcher;
use crate::logger::{self, AccessLogFormat};
use crate::safety;

pub use listener::create_listener;
pub use signal::shutdown_signal;

/// A bound server, ready to accept connections
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    dispatcher: Rc<Dispatcher>,
}

impl Server {
    /// Resolve the served root, run the exposure check, and bind.
    ///
    /// Nothing is accepted until [`Server::run`].
    pub async fn bind(
        config: ServerConfig,
        access_log_format: AccessLogFormat,
    ) -> Result<Self, StartupError> {
        Self::bind_with_gate(config, access_log_format, safety::check_safe_pubdir).await
    }

    /// `bind` with the exposure check supplied by the caller
    async fn bind_with_gate(
        config: ServerConfig,
        access_log_format: AccessLogFormat,
        gate: impl FnOnce(&Path) -> Result<(), String>,
    ) -> Result<Self, StartupError> {
        let root = resolve_root(&config.pubdir)?;
        let local_only = config.is_local_only();
        if !local_only && !config.public {
            gate(&root).map_err(StartupError::UnsafePubdir)?;
        }

        let addr = resolve_addr(config.bind_host(), config.port).await?;
        let listener =
            listener::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { addr, source })?;

        let state = AppState::new(config, root, local_only).with_access_log_format(access_log_format);
        Ok(Self {
            listener,
            local_addr,
            dispatcher: Rc::new(Dispatcher::new(state)),
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &AppState {
        self.dispatcher.state()
    }

    /// Base URL clients should use, e.g. `http://localhost:8000`
    pub fn url(&self) -> String {
        addr_to_url(self.local_addr)
    }

    /// Print `serving <dir> at <url>`
    pub fn log_serving(&self) {
        let cwd = std::env::current_dir().ok();
        let home = dirs::home_dir();
        let dir = display_root(&self.state().root, cwd.as_deref(), home.as_deref());
        logger::log_serving(&dir, &self.url(), self.state().local_only);
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Must run inside a `tokio::task::LocalSet`. Connections already
    /// accepted keep running after this returns.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => {
                            connection::handle_connection(stream, peer, Rc::clone(&self.dispatcher));
                        }
                        Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                    }
                }
                () = &mut shutdown => break,
            }
        }
    }
}

/// Canonicalize the served directory, following symlinks
fn resolve_root(pubdir: &Path) -> Result<PathBuf, StartupError> {
    pubdir.canonicalize().map_err(|e| {
        let shown = std::path::absolute(pubdir).unwrap_or_else(|_| pubdir.to_path_buf());
        if e.kind() == io::ErrorKind::NotFound {
            StartupError::PubdirMissing(shown)
        } else {
            StartupError::PubdirUnreadable(shown, e)
        }
    })
}

/// Resolve a host name or literal address; the first result wins
async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr, StartupError> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    let invalid = |reason: String| StartupError::InvalidHost {
        host: host.to_string(),
        port,
        reason,
    };

    tokio::net::lookup_host((bare, port))
        .await
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("no addresses found".to_string()))
}

/// How the served root is shown in the startup message.
///
/// `./sub` below the working directory, `~/sub` below home, else absolute.
pub fn display_root(root: &Path, cwd: Option<&Path>, home: Option<&Path>) -> String {
    if let Some(rel) = cwd.and_then(|cwd| root.strip_prefix(cwd).ok()) {
        return if rel.as_os_str().is_empty() {
            "./".to_string()
        } else {
            format!("./{}", rel.display())
        };
    }

    if let Some(rel) = home.and_then(|home| root.strip_prefix(home).ok()) {
        return if rel.as_os_str().is_empty() {
            "~/".to_string()
        } else {
            format!("~/{}", rel.display())
        };
    }

    root.display().to_string()
}

/// `http://host:port` for a bound address.
///
/// Loopback is shown as `localhost`. An all-interfaces bind shows this
/// machine's outbound IPv4 address, or `0.0.0.0` when there is none.
pub fn addr_to_url(addr: SocketAddr) -> String {
    format_url(addr, outbound_ipv4)
}

fn format_url(addr: SocketAddr, interface_addr: impl FnOnce() -> Option<Ipv4Addr>) -> String {
    let ip = addr.ip().to_canonical();
    let host = if ip.is_loopback() {
        "localhost".to_string()
    } else if ip.is_unspecified() {
        interface_addr().unwrap_or(Ipv4Addr::UNSPECIFIED).to_string()
    } else if ip.is_ipv6() {
        format!("[{ip}]")
    } else {
        ip.to_string()
    };
    format!("http://{host}:{}", addr.port())
}

/// Address of the interface that routes outward.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((ROUTE_LOOKUP_ADDR, 9)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

/// TEST-NET-1 documentation address, only used for route selection
const ROUTE_LOOKUP_ADDR: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 1);
