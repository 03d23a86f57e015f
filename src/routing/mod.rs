//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers)
//!     → axum exact-path match (registered via router.rs)
//!     → span middleware (extract traceparent, start span, finish span)
//!     → handler
//!
//! Route Compilation (at startup):
//!     basepath
//!     → path.rs (join + clean)
//!     → TracedRouter::handle per route
//!     → Freeze as immutable axum Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact paths only, no wildcards or parameters
//! - Unmatched requests fall through to axum's 404

pub mod path;
pub mod router;

pub use router::TracedRouter;
