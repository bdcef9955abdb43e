use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use servedir::config::Config;
use servedir::logger::{self, AccessLogFormat};
use servedir::server::{self, Server};
use servedir::StartupError;

/// Time in-flight connections get to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(
    name = "servedir",
    version,
    about = "Serve a directory over HTTP (POST writes files when bound to localhost)"
)]
struct Cli {
    /// Directory to serve (default: current directory)
    dir: Option<PathBuf>,

    /// Port to listen on; 0 picks a free one
    #[arg(short, long)]
    port: Option<u16>,

    /// Host or address to bind
    #[arg(long)]
    host: Option<String>,

    /// Accept connections from other machines, skipping the home-directory check
    #[arg(long)]
    public: bool,

    /// Disable access logging and the startup message
    #[arg(short, long)]
    quiet: bool,

    /// Answer 404 for directories without an index file
    #[arg(long)]
    no_dirlist: bool,

    /// Include dotfiles in directory listings
    #[arg(long)]
    dirlist_hidden: bool,

    /// Index file served for directories
    #[arg(long, value_name = "NAME")]
    index: Option<String>,

    /// Content-Type for files with an unknown extension
    #[arg(long, value_name = "TYPE")]
    default_mime_type: Option<String>,

    /// Throttle response bodies to emulate a slow connection
    #[arg(long)]
    slow: bool,

    /// Configuration file (default: ./servedir.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Flags win over file and environment values
    fn apply(self, cfg: &mut Config) {
        let server = &mut cfg.server;
        if let Some(dir) = self.dir {
            server.pubdir = dir;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(host) = self.host {
            server.host = host;
        }
        if let Some(index) = self.index {
            server.index_filename = index;
        }
        if let Some(mime) = self.default_mime_type {
            server.default_mime_type = Some(mime);
        }
        server.public |= self.public;
        server.quiet |= self.quiet;
        server.dirlist.disable |= self.no_dirlist;
        server.dirlist.show_hidden |= self.dirlist_hidden;
        server.emulate_slow_connection |= self.slow;
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut cfg = match Config::load_from(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => return fail(&StartupError::from(e)),
    };
    cli.apply(&mut cfg);

    if let Err(e) = logger::init(&cfg.logging) {
        return fail(&StartupError::Logger(e));
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    match local.block_on(&runtime, async_main(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let format = AccessLogFormat::from_name(&cfg.logging.access_log_format).unwrap_or_else(|| {
        logger::log_warning(&format!(
            "Unknown access log format '{}', using default",
            cfg.logging.access_log_format
        ));
        AccessLogFormat::Default
    });
    let quiet = cfg.server.quiet;

    let server = Server::bind(cfg.server, format).await?;
    if !quiet {
        server.log_serving();
    }

    server
        .run(async {
            if let Err(e) = server::shutdown_signal().await {
                logger::log_error(&format!("Failed to listen for shutdown signals: {e}"));
                std::future::pending::<()>().await;
            }
        })
        .await;

    if !quiet {
        logger::log_info(" stopping server");
    }
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    Ok(())
}

fn fail(err: &StartupError) -> ExitCode {
    eprintln!("{err}");
    ExitCode::FAILURE
}
