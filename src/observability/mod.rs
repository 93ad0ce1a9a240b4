//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields: method, url, remote, backend)
//!     → logging.rs installs the subscriber (fmt + EnvFilter)
//!
//! Consumers:
//!     → stdout, picked up by the log aggregation of the deployment
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated strings, for request data
//! - Log level configurable via `RUST_LOG`

pub mod logging;

pub use logging::init_logging;
