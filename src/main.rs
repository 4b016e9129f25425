//! Pulse-Scraper main entry point
//!
//! This is the command-line interface for the Pulse-Scraper service.

use anyhow::Context;
use clap::Parser;
use pulse_scraper::config::{load_config_with_hash, validate, Config};
use pulse_scraper::PulseService;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pulse-Scraper: periodic page scraping with a queryable history
///
/// Accepts scrape tasks over HTTP, fetches each URL on its own interval and
/// keeps a bounded history of every result in memory.
#[derive(Parser, Debug)]
#[command(name = "pulse-scraper")]
#[command(version)]
#[command(about = "Periodic page scraper with a queryable history", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration file
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(bind) = cli.bind {
        config.server.bind_address = bind.to_string();
    }
    validate(&config).context("Invalid configuration")?;

    if cli.check_config {
        print_config(&config);
        return Ok(());
    }

    serve(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pulse_scraper=info,tower_http=info,warn"),
            1 => EnvFilter::new("pulse_scraper=debug,tower_http=debug,info"),
            2 => EnvFilter::new("pulse_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --check-config: shows the effective configuration
fn print_config(config: &Config) {
    println!("=== Pulse-Scraper Configuration ===\n");

    println!("Server:");
    println!("  Bind address: {}", config.server.bind_address);
    println!("  API prefix: {:?}", config.server.api_prefix);

    println!("\nScheduler:");
    println!(
        "  Submission queue capacity: {}",
        config.scheduler.submission_queue_capacity
    );
    println!(
        "  Submission timeout: {}ms",
        config.scheduler.submission_timeout_ms
    );

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent());
    println!("  Request timeout: {}ms", config.fetcher.request_timeout_ms);
    println!("  Connect timeout: {}ms", config.fetcher.connect_timeout_ms);
    println!("  Max redirects: {}", config.fetcher.max_redirects);

    println!("\nStore:");
    println!(
        "  Max history per key: {}",
        config.store.max_history_per_key
    );

    println!("\nEvents:");
    println!("  Buffer capacity: {}", config.events.buffer_capacity);
    println!("  Overflow wait: {}ms", config.events.overflow_wait_ms);

    println!("\n✓ Configuration is valid");
}

/// Runs the service until Ctrl-C
async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;

    let service = PulseService::start(&config).context("Failed to start scraper service")?;
    let app = service.router();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "Listening on {} (API under {:?})",
        addr,
        config.server.api_prefix
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutting down");
    service.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
