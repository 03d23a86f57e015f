//! HotROD frontend (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  FRONTEND                    │
//!                      │                                              │
//!   Browser / client   │  ┌──────────┐   ┌─────────────┐              │
//!   ───────────────────┼─▶│  axum    │──▶│ traced route│─┐            │
//!                      │  │ listener │   │ (span start)│ │            │
//!                      │  └──────────┘   └─────────────┘ │            │
//!                      │          ┌──────────────────────┴───┐        │
//!                      │          ▼                          ▼        │
//!                      │   ┌────────────┐            ┌────────────┐   │
//!                      │   │   index    │            │  dispatch  │   │
//!                      │   │ (template) │            │   (form)   │   │
//!                      │   └────────────┘            └─────┬──────┘   │
//!                      │                                   │          │   traceparent
//!                      │                                   ▼          │ ─────────────▶ ETA
//!                      │                           ┌──────────────┐   │               aggregator
//!                      │                           │  aggregator  │───┼──────────────▶
//!                      │                           │    client    │   │
//!                      │                           └──────────────┘   │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use eta_frontend::config::{check_config, load_config, FrontendConfig};
use eta_frontend::lifecycle::{signals, startup, Shutdown};
use eta_frontend::observability::init_logging;

#[derive(Parser)]
#[command(name = "eta-frontend")]
#[command(about = "Frontend service of the HotROD ride-dispatch demo", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (host:port).
    #[arg(long)]
    frontend_host_port: Option<String>,

    /// Path prefix for all routes.
    #[arg(long)]
    basepath: Option<String>,

    /// Endpoint of the ETA aggregator.
    #[arg(long)]
    aggregator_url: Option<String>,

    /// Log format: pretty or json.
    #[arg(long)]
    log_format: Option<String>,

    /// Span exporter: none or stdout.
    #[arg(long)]
    trace_exporter: Option<String>,
}

impl Cli {
    fn apply(self, mut config: FrontendConfig) -> FrontendConfig {
        if let Some(v) = self.frontend_host_port {
            config.services.frontend_host_port = v;
        }
        if let Some(v) = self.basepath {
            config.services.basepath = v;
        }
        if let Some(v) = self.aggregator_url {
            config.aggregator.url = v;
        }
        if let Some(v) = self.log_format {
            config.observability.log_format = v;
        }
        if let Some(v) = self.trace_exporter {
            config.observability.trace_exporter = v;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let base = match cli.config.take() {
        Some(path) => load_config(&path)?,
        None => FrontendConfig::default(),
    };
    let config = check_config(cli.apply(base))?;

    init_logging(&config.observability)?;
    tracing::info!("eta-frontend v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        frontend = %config.services.frontend_host_port,
        driver = %config.services.driver_host_port,
        customer = %config.services.customer_host_port,
        route = %config.services.route_host_port,
        basepath = %config.services.basepath,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(&shutdown);

    startup::run(config, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
