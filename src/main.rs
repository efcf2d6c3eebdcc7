//! User API service and polling client entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use user_api::api::{self, AppState};
use user_api::config::Config;
use user_api::error::AppError;
use user_api::metrics;
use user_api::poller::{PollSession, UserApiClient};
use user_api::utils::shutdown_signal;

/// In-memory user CRUD API and its polling client.
#[derive(Parser, Debug)]
#[command(name = "user-api")]
#[command(about = "In-memory user CRUD API with a periodic polling client")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the record store HTTP service (default).
    Serve {
        /// Port to listen on (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the polling client against a record store.
    Poll {
        /// Record store base URL (overrides API_URL).
        #[arg(long)]
        api_url: Option<String>,

        /// Poll interval in milliseconds (overrides INTERVAL).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration is read before logging starts so RUST_LOG and VERBOSE
    // from .env apply; load errors are reported once tracing is up.
    let loaded = Config::load();

    // Initialize logging
    let directives = match &loaded {
        Ok(config) => config.log_directives(args.verbose),
        Err(_) => Config::default().log_directives(args.verbose),
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(loaded, port).await,
        Some(Command::Poll { api_url, interval }) => cmd_poll(loaded, api_url, interval).await,
        Some(Command::CheckConfig) => cmd_check_config(loaded),
        None => cmd_serve(loaded, None).await,
    }
}

type Loaded = Result<Config, envy::Error>;

/// Validate loaded configuration after overrides, logging failures.
fn load_config(loaded: Loaded, apply: impl FnOnce(&mut Config)) -> anyhow::Result<Config> {
    let mut config = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    apply(&mut config);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(AppError::InvalidConfig(e).into());
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config(loaded: Loaded) -> anyhow::Result<()> {
    println!("============================================================");
    println!("USER API - CONFIGURATION CHECK");
    println!("============================================================");

    print!("Loading configuration... ");
    let config = match loaded {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  API URL: {}", config.api_url);
    println!("  Poll Interval: {}ms", config.interval);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Log Filter: {}", config.log_directives(false));
    println!(
        "  Metrics: {}",
        if config.metrics_enabled { "Enabled" } else { "Disabled" }
    );
    if let Some(port) = config.metrics_port {
        println!("  Client Metrics Port: {}", port);
    }
    println!("============================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("============================================================");

    Ok(())
}

/// Run the record store service.
async fn cmd_serve(loaded: Loaded, port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(loaded, |config| {
        if let Some(port) = port_override {
            config.port = port;
        }
    })?;

    let mut state = AppState::new();
    if config.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => warn!("Metrics disabled: {}", e),
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("User API Backend running on port {}", config.port);
    info!("Health check: http://localhost:{}/health", config.port);

    api::serve(listener, state, shutdown_signal()).await?;

    info!("User API Backend stopped");
    Ok(())
}

/// Run the polling client until SIGINT/SIGTERM.
async fn cmd_poll(
    loaded: Loaded,
    api_url: Option<String>,
    interval: Option<u64>,
) -> anyhow::Result<()> {
    let config = load_config(loaded, |config| {
        if let Some(url) = api_url {
            config.api_url = url;
        }
        if let Some(ms) = interval {
            config.interval = ms;
        }
    })?;

    if config.metrics_enabled {
        if let Some(port) = config.metrics_port {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            match metrics::install_listener(addr) {
                Ok(()) => info!("Metrics listening on {}", addr),
                Err(e) => warn!("Metrics disabled: {}", e),
            }
        }
    }

    info!("============================================================");
    info!("User API Client Service Starting...");
    info!("API URL: {}", config.api_url);
    info!("Poll Interval: {}ms", config.interval);
    info!("============================================================");

    let client = UserApiClient::new(&config)?;
    let mut session = PollSession::new(client, config.poll_interval());

    // In-flight calls are dropped on cancellation, not drained.
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down...");
        signal_token.cancel();
    });

    // Logs the final request count on the way out.
    session.run(token).await;
    Ok(())
}
