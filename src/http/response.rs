//! Response handling and transformation.
//!
//! # Responsibilities
//! - Hand the backend response back to the client
//! - Strip hop-by-hop headers
//! - Map forwarding errors to gateway status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Backend timeouts result in 504 Gateway Timeout
//! - Everything else that goes wrong upstream is 502 Bad Gateway

use std::time::Duration;

use axum::{
    body::Body,
    http::{Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use thiserror::Error;

use crate::http::headers::remove_hop_by_hop;

/// Failure while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("could not build upstream request: {0}")]
    Build(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
    #[error("upstream switched protocols without being asked to")]
    UnexpectedUpgrade,
    #[error("client asked to upgrade to {requested:?}, upstream switched to {offered:?}")]
    UpgradeMismatch { requested: String, offered: String },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Build(_)
            | ProxyError::Upstream(_)
            | ProxyError::UnexpectedUpgrade
            | ProxyError::UpgradeMismatch { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match self {
            ProxyError::Timeout(_) => "Upstream request timed out",
            _ => "Upstream request failed",
        };
        (self.status(), message).into_response()
    }
}

/// Convert a backend response into the client response, body streamed as-is.
pub fn into_client_response(response: HttpResponse<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    remove_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
