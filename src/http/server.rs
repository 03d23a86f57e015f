//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Own the configuration and dependency handles for the process lifetime
//! - Build the trace-aware router (index + dispatch under the base path)
//! - Wire up access logging
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::aggregator::EtaAggregator;
use crate::assets::{AssetSource, WebAssets};
use crate::config::ConfigOptions;
use crate::http::handlers::{dispatch, index};
use crate::http::template::TemplateRenderer;
use crate::observability::Tracer;
use crate::routing::{path, TracedRouter};

/// Read-only state shared by all request tasks.
pub struct AppState<A> {
    pub aggregator: A,
    pub templates: TemplateRenderer,
}

/// The frontend HTTP service.
pub struct FrontendServer<A> {
    host_port: String,
    basepath: String,
    tracer: Tracer,
    state: Arc<AppState<A>>,
}

impl<A: EtaAggregator> FrontendServer<A> {
    /// Create a server serving the bundled web assets.
    pub fn new(options: &ConfigOptions, tracer: Tracer, aggregator: A) -> Self {
        Self::with_assets(options, tracer, aggregator, Arc::new(WebAssets))
    }

    /// Create a server that loads templates from `assets`.
    pub fn with_assets(
        options: &ConfigOptions,
        tracer: Tracer,
        aggregator: A,
        assets: Arc<dyn AssetSource>,
    ) -> Self {
        Self {
            host_port: options.frontend_host_port.clone(),
            basepath: options.basepath.clone(),
            tracer,
            state: Arc::new(AppState {
                aggregator,
                templates: TemplateRenderer::new(assets),
            }),
        }
    }

    /// Paths of the index and dispatch routes.
    pub fn route_paths(&self) -> (String, String) {
        let prefix = path::route_prefix(&self.basepath);
        (path::join(&prefix, "/"), path::join(&prefix, "/dispatch"))
    }

    /// Build the router with every route instrumented.
    pub fn router(&self) -> Router {
        let (index_path, dispatch_path) = self.route_paths();

        let routes = TracedRouter::new(self.tracer.clone())
            .handle(&index_path, get(index::<A>))
            .handle(&dispatch_path, get(dispatch::<A>).post(dispatch::<A>));
        tracing::debug!(patterns = ?routes.patterns(), "Routes registered");

        routes
            .into_router()
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Configured bind address.
    pub fn host_port(&self) -> &str {
        &self.host_port
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let address = format!("http://{}", path::join(&addr.to_string(), &self.basepath));
        tracing::info!(address = %address, "Starting");

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
