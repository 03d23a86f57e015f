//! Front-door HTTP service of the HotROD ride-dispatch demo.
//!
//! Serves the landing page and the `dispatch` JSON API, wrapping every
//! request in an OpenTelemetry span and delegating ETA computation to a
//! downstream aggregator.

pub mod aggregator;
pub mod assets;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use aggregator::{AggregatorError, EtaAggregator, RemoteEta};
pub use config::{ConfigOptions, FrontendConfig};
pub use http::FrontendServer;
pub use lifecycle::Shutdown;
pub use observability::{RequestSpan, Tracer};
