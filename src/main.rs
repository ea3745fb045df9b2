//! HTTP trigger (v1)
//!
//! Accepts HTTP requests, hands each one to the handler registered for its
//! path, and writes the handler's response back. Handlers reach the outside
//! world through outbound HTTP, key-value and pub/sub connectors.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::Dispatcher ──▶ handlers
//!                                                                 │
//!                                        outbound::Capabilities ◀─┘
//!                                        (HTTP, Redis KV, Redis pub/sub)
//!     Client Response
//!     ◀────────────── http::server ◀── Response
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use http_trigger::config::{load_config, validate_config, TriggerConfig};
use http_trigger::handlers::build_dispatcher;
use http_trigger::lifecycle::{startup, Shutdown};
use http_trigger::observability::{logging, metrics};
use http_trigger::outbound::Capabilities;
use http_trigger::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "http-trigger", version, about = "HTTP request dispatch trigger")]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Include error details in 500 response bodies
    #[arg(long)]
    verbose_errors: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TriggerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if cli.verbose_errors {
        config.dispatch.verbose_errors = true;
    }
    if let Err(errors) = validate_config(&config) {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(format!("Validation failed: {}", messages.join(", ")).into());
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("http-trigger v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        verbose_errors = config.dispatch.verbose_errors,
        "Configuration loaded"
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

    let capabilities = Capabilities::from_config(&config)?;
    let dispatcher = Arc::new(build_dispatcher(&config, capabilities));
    startup::warm_up(&dispatcher, &config.dispatch.warmup_path).await;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, dispatcher);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
