//! Startup orchestration.
//!
//! Config is compiled before the listener binds, so a bad config never
//! accepts a connection.

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};

/// Compile `config`, bind, and serve until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.bind_address();

    tracing::info!(
        bind_address = %bind_address,
        profile = ?config.profile,
        web = %config.targets.web,
        api = %config.targets.api,
        auth = %config.targets.auth,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, server_shutdown).await?;
    Ok(())
}
