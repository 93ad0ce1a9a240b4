//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, log, token injection, route lookup)
//!     → rewrite.rs (backend URI, Host header)
//!     → headers.rs (hop-by-hop and forwarding headers)
//!     → hyper client → backend
//!     → response.rs (stream back, map errors to 502/504)
//!     → Send to client
//! ```
//!
//! On a 101 answer, upgrade.rs takes over and tunnels bytes both ways.

pub mod headers;
pub mod response;
pub mod rewrite;
pub mod server;
pub mod upgrade;

pub use response::ProxyError;
pub use rewrite::{BackendTargets, RewriteRule};
pub use server::{AppState, HttpServer};
