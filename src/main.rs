//! hotmock: a configuration-driven HTTP mock server.
//!
//! # Architecture Overview
//!
//! ```text
//!   api.json + include files
//!          │
//!          ▼
//!   ┌─────────────┐  change   ┌──────────────────┐
//!   │  watcher    │──────────▶│ reload controller│
//!   └─────────────┘           └────────┬─────────┘
//!                                      │ load + build
//!                                      ▼
//!                             ┌──────────────────┐
//!                             │ SharedRouteTable │  atomic swap
//!                             └────────┬─────────┘
//!                                      │ snapshot per request
//!     Client Request   ┌─────────┐     ▼
//!     ────────────────▶│  axum   │──▶ dispatch ──▶ 202 / 200.. / 404 / 405
//!                      └─────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use hotmock::config;
use hotmock::http::server::MockServer;
use hotmock::lifecycle::{signals, Shutdown};
use hotmock::observability::{logging, LogFormat};
use hotmock::reload::{self, ReloadController};
use hotmock::routing::{RouteTable, SharedRouteTable};

/// Serve mock HTTP responses from a JSON route table.
#[derive(Parser)]
#[command(name = "hotmock")]
#[command(version)]
struct Cli {
    /// Entry configuration file
    #[arg(short, long, default_value = "api.json")]
    config: PathBuf,

    /// Override the listen address from the configuration file
    #[arg(long)]
    listen: Option<String>,

    /// Do not reload when configuration files change
    #[arg(long)]
    no_watch: bool,

    /// Window for coalescing bursts of file changes, in milliseconds
    #[arg(long, default_value = "100")]
    debounce_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    tracing::info!("hotmock v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load(&cli.config)?;
    // The override only affects binding; reloads compare against the file.
    let bind_address = cli
        .listen
        .as_deref()
        .map(config::listen_address)
        .unwrap_or_else(|| config.bind_address());

    let table = RouteTable::build(&config);
    tracing::info!(
        path = %cli.config.display(),
        routes = table.len(),
        "Configuration loaded"
    );
    let routes = SharedRouteTable::new(table);

    let listener = TcpListener::bind(bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();

    let reload_task = if cli.no_watch {
        None
    } else {
        let controller = ReloadController::new(&cli.config, &config, routes.clone())
            .with_debounce(Duration::from_millis(cli.debounce_ms));
        Some(reload::spawn(controller, shutdown.subscribe())?)
    };

    let server = MockServer::with_timeout(routes, Duration::from_secs(cli.request_timeout_secs));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    server.run(listener, server_shutdown).await?;

    if let Some(task) = reload_task {
        let _ = task.await;
    }
    Ok(())
}
