//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::aggregator::{AggregatorError, RemoteEta};
use crate::config::FrontendConfig;
use crate::http::FrontendServer;
use crate::observability::{init_tracer, TelemetryError};

/// Error raised while bringing the service up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("aggregator client: {0}")]
    Aggregator(#[from] AggregatorError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bring the frontend up and serve until `shutdown` fires.
///
/// The receiver is subscribed by the caller, so a signal raised while
/// starting up still stops the server once it is listening.
pub async fn run(
    config: FrontendConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let telemetry = init_tracer(&config.observability)?;
    let tracer = telemetry.tracer();

    let aggregator = RemoteEta::new(&config.aggregator, tracer.clone())?;
    tracing::info!(
        url = %aggregator.url(),
        timeout_secs = config.aggregator.timeout_secs,
        "Aggregator client ready"
    );

    let server = FrontendServer::new(&config.services, tracer, aggregator);

    let listener = TcpListener::bind(server.host_port())
        .await
        .map_err(|source| StartupError::Bind {
            address: server.host_port().to_string(),
            source,
        })?;

    server
        .run(listener, shutdown)
        .await
        .map_err(StartupError::Serve)?;

    drop(telemetry);
    Ok(())
}
