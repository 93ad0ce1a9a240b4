//! Service gateway
//!
//! Single-address HTTP gateway in front of the web, api and auth backends.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                   GATEWAY                     │
//!     Client Request      │  ┌────────────┐   ┌────────────┐   ┌────────┐ │
//!     ────────────────────┼─▶│ dispatcher │──▶│ route table│──▶│rewrite │─┼──▶ web / api / auth
//!                         │  │ log + token│   │ exact/prefix│  │URI+Host│ │
//!                         │  └────────────┘   └────────────┘   └────────┘ │
//!     Client Response     │                                               │
//!     ◀───────────────────┼──────────── streamed unmodified ◀─────────────┼─── backend
//!                         └───────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from the environment (`TARGET_WEB`, `TARGET_API`,
//! `TARGET_AUTH`, `BASE_URL`, `GATEWAY_PROFILE`, `GATEWAY_LISTEN`) and an
//! optional TOML file named by `GATEWAY_CONFIG`.

use service_gateway::config;
use service_gateway::lifecycle::startup;
use service_gateway::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_logging();

    tracing::info!("service-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
