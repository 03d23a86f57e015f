//! ETA aggregation contract.
//!
//! # Data Flow
//! ```text
//! dispatch handler
//!     → EtaAggregator::get(span, customer_id)   (runs under the request span)
//!     → Response (opaque, serialized to JSON by the handler)
//! ```
//!
//! # Design Decisions
//! - The frontend never looks inside the response
//! - Every failure is reported as-is; nothing is retried here
//! - The request span is passed explicitly so implementations can create
//!   child spans and propagate the trace downstream

pub mod remote;

use async_trait::async_trait;
use serde::Serialize;

use crate::observability::RequestSpan;

pub use remote::RemoteEta;

/// Failure reported by an aggregator.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    /// The downstream call could not be completed.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The downstream answered with a non-success status.
    #[error("aggregator returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Any other failure, reported with its message.
    #[error("{0}")]
    Failed(String),
}

/// Computes the best ETA for a customer.
#[async_trait]
pub trait EtaAggregator: Send + Sync + 'static {
    /// Serializable result handed back to the caller.
    type Response: Serialize + Send;

    async fn get(
        &self,
        span: &RequestSpan,
        customer_id: &str,
    ) -> Result<Self::Response, AggregatorError>;
}
