//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, route table, access log)
//!     → [routing layer opens the request span]
//!     → handlers.rs
//!         index:    template.rs (load + compile page) → HTML
//!         dispatch: form.rs (parameters) → aggregator → JSON
//!     → response.rs (failures become status + message)
//!     → Send to client
//! ```

pub mod form;
pub mod handlers;
pub mod response;
pub mod server;
pub mod template;

pub use handlers::{INDEX_TEMPLATE, MISSING_CUSTOMER};
pub use response::{Classify, HttpError};
pub use server::{AppState, FrontendServer};
pub use template::{Page, TemplateError, TemplateRenderer};
