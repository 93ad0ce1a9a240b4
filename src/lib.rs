//! Path-prefix service gateway.
//!
//! Presents one listening address and forwards each request to the web, api
//! or auth backend by path, adding a bearer token when one is available.

pub mod config;
pub mod credentials;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
