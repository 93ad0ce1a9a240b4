//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Compile the validated config into shared, read-only state
//! - Create the Axum router with a single catch-all handler
//! - Log every request and inject the bearer token
//! - Dispatch requests through the route table
//! - Forward requests to the matched backend and stream the answer back
//! - Hand protocol upgrades to the tunnel in upgrade.rs

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::{Backend, ConfigError, GatewayConfig};
use crate::credentials::CredentialSource;
use crate::http::headers::requested_upgrade;
use crate::http::response::{into_client_response, ProxyError};
use crate::http::rewrite::{BackendTargets, RewriteRule};
use crate::http::upgrade::switch_protocols;
use crate::routing::{Resolution, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub targets: Arc<BackendTargets>,
    pub rewrite: Arc<RewriteRule>,
    pub credentials: Arc<CredentialSource>,
    pub client: Client<HttpConnector, Body>,
    pub upstream_timeout: Duration,
}

impl AppState {
    /// Compile a configuration. Fails on anything validation would reject.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let routes = RouteTable::from_config(&config.effective_routes()).map_err(invalid)?;
        let targets = BackendTargets::from_config(&config.targets).map_err(invalid)?;
        let rewrite = RewriteRule::from_base_url(config.base_url.as_deref()).map_err(invalid)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            routes: Arc::new(routes),
            targets: Arc::new(targets),
            rewrite: Arc::new(rewrite),
            credentials: Arc::new(CredentialSource::from_config(&config.credentials)),
            client,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        })
    }
}

fn invalid(e: impl Into<ValidationError>) -> ConfigError {
    ConfigError::Validation(vec![e.into()])
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The request handler, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            profile = ?self.config.profile,
            base_url = ?self.config.base_url,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Gateway entry point for every request.
async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    tracing::info!(
        method = %request.method(),
        url = %request.uri(),
        remote = %remote,
        user_agent = %user_agent,
        "request"
    );

    let token = state.credentials.resolve().await;
    if !token.is_empty() {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("Bearer token is not a valid header value; forwarding without it");
            }
        }
    }

    let backend = match state.routes.lookup(request.uri().path(), request.uri().query()) {
        Resolution::Matched(backend) => backend,
        Resolution::Redirect(location) => {
            return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
        }
        Resolution::NotFound => {
            tracing::warn!(path = %request.uri().path(), "No route matched");
            return (StatusCode::NOT_FOUND, "404 page not found").into_response();
        }
    };

    match forward(&state, backend, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(backend = %backend, error = %e, "Upstream error");
            e.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    backend: Backend,
    mut request: Request<Body>,
) -> Result<Response, ProxyError> {
    let upgrade = requested_upgrade(request.headers());
    let client_upgrade = upgrade.as_ref().map(|_| hyper::upgrade::on(&mut request));

    let outbound = state.rewrite.apply(state.targets.get(backend), request)?;

    tracing::debug!(
        backend = %backend,
        uri = %outbound.uri(),
        "Proxying request"
    );

    let response = tokio::time::timeout(state.upstream_timeout, state.client.request(outbound))
        .await
        .map_err(|_| ProxyError::Timeout(state.upstream_timeout))??;

    if response.status() == StatusCode::SWITCHING_PROTOCOLS {
        tracing::debug!(backend = %backend, upgrade = ?upgrade, "Switching protocols");
        return switch_protocols(upgrade.as_ref(), client_upgrade, response);
    }

    Ok(into_client_response(response))
}
