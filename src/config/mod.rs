//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! profile defaults
//!     → loader.rs (optional TOML file, then environment overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into shared state by the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow an empty environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, load_with, ConfigError};
pub use schema::Backend;
pub use schema::CredentialConfig;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::Profile;
pub use schema::RouteConfig;
pub use schema::TargetConfig;
pub use schema::TimeoutConfig;
