//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → FrontendConfig (validated, immutable)
//!     → owned by FrontendServer for the process lifetime
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, load_config, ConfigError};
pub use schema::AggregatorConfig;
pub use schema::ConfigOptions;
pub use schema::FrontendConfig;
pub use schema::ObservabilityConfig;
