//! Path-chain router.
//!
//! # Architecture Overview
//!
//! ```text
//!     route file ──▶ config ──▶ prepared endpoints ◀── watcher (reload)
//!                                      │
//!     Client Request                   ▼
//!     ─────────────▶ http server ──▶ longest prefix ──▶ MethodSet::find
//!                                                           │
//!     Client Response                                       ▼
//!     ◀───────────── JSON (chain, params, tail) ◀──── Match / status
//! ```
//!
//! Subcommands:
//! - `check <file>`: load and prepare a route file, report every issue
//! - `find <file> <METHOD> <PATH>`: run one lookup and print the result
//! - `serve <file>`: serve lookups over HTTP, reloading on change

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use chain_router::config::watcher::ConfigWatcher;
use chain_router::config::{build_endpoints, load_config, Endpoints, RoutesConfig};
use chain_router::http::server::lookup;
use chain_router::http::HttpServer;
use chain_router::lifecycle::signals::shutdown_on_signal;
use chain_router::lifecycle::Shutdown;
use chain_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "chain-router")]
#[command(about = "Route URL paths through chains of segment patterns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and prepare a route file
    Check { file: PathBuf },
    /// Resolve one request against a route file
    Find {
        file: PathBuf,
        method: String,
        path: String,
    },
    /// Serve lookups over HTTP
    Serve {
        file: PathBuf,
        /// Do not reload the route file on change
        #[arg(long)]
        no_watch: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Find { file, method, path } => find(&file, &method, &path),
        Commands::Serve { file, no_watch } => serve(file, !no_watch),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

/// Load, validate and prepare; every endpoint issue is printed.
fn prepare(file: &Path) -> Result<(RoutesConfig, Option<Endpoints>), Box<dyn std::error::Error>> {
    let config = load_config(file)?;
    logging::init_logging(&config.observability.log_level);

    match build_endpoints(&config) {
        Ok(endpoints) => Ok((config, Some(endpoints))),
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            Ok((config, None))
        }
    }
}

fn check(file: &Path) -> CliResult {
    let (_, endpoints) = prepare(file)?;
    let Some(endpoints) = endpoints else {
        return Ok(ExitCode::FAILURE);
    };

    for prefix in endpoints.prefixes() {
        let methods = endpoints
            .get(prefix)
            .map(|set| set.methods().collect::<Vec<_>>().join(","))
            .unwrap_or_default();
        println!("{prefix}\t{methods}");
    }
    Ok(ExitCode::SUCCESS)
}

fn find(file: &Path, method: &str, path: &str) -> CliResult {
    let (_, endpoints) = prepare(file)?;
    let Some(endpoints) = endpoints else {
        return Ok(ExitCode::FAILURE);
    };

    let (status, body) = lookup(&endpoints, method, path);
    println!("{}", status.as_str());
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(ExitCode::SUCCESS)
}

fn serve(file: PathBuf, watch: bool) -> CliResult {
    tokio::runtime::Runtime::new()?.block_on(run_server(file, watch))
}

async fn run_server(file: PathBuf, watch: bool) -> CliResult {
    let (config, endpoints) = prepare(&file)?;
    let Some(endpoints) = endpoints else {
        return Ok(ExitCode::FAILURE);
    };

    tracing::info!(
        bind_address = %config.server.bind_address,
        endpoints = endpoints.len(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Route file loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Kept alive for the lifetime of the server.
    let (_watcher, updates) = if watch {
        let (watcher, updates) = ConfigWatcher::new(&file);
        (Some(watcher.run()?), Some(updates))
    } else {
        (None, None)
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    HttpServer::new(&config.server, endpoints)
        .run(listener, updates, stop)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
