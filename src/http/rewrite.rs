//! Outbound request rewriting.
//!
//! # Responsibilities
//! - Point the request URI at the matched backend
//! - Choose the outbound Host header
//! - Leave method, body and end-to-end headers alone
//!
//! # Design Decisions
//! - The inbound path is appended to the backend's base path, never stripped
//! - A configured base URL host wins over the inbound Host header

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderValue, Request, Uri, Version};
use url::{Position, Url};

use crate::config::validation::{parse_base_url, parse_target, ValidationError};
use crate::config::{Backend, TargetConfig};
use crate::http::headers::prepare_request_headers;
use crate::http::response::ProxyError;

/// Parsed base URLs of the three backends.
#[derive(Debug, Clone)]
pub struct BackendTargets {
    web: Url,
    api: Url,
    auth: Url,
}

impl BackendTargets {
    pub fn from_config(config: &TargetConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            web: parse_target("targets.web", &config.web)?,
            api: parse_target("targets.api", &config.api)?,
            auth: parse_target("targets.auth", &config.auth)?,
        })
    }

    pub fn get(&self, backend: Backend) -> &Url {
        match backend {
            Backend::Web => &self.web,
            Backend::Api => &self.api,
            Backend::Auth => &self.auth,
        }
    }
}

/// Turns an inbound request into the request sent upstream.
#[derive(Debug, Clone, Default)]
pub struct RewriteRule {
    host_override: Option<HeaderValue>,
}

impl RewriteRule {
    pub fn new(host_override: Option<HeaderValue>) -> Self {
        Self { host_override }
    }

    /// Build from the optional external base URL.
    pub fn from_base_url(base_url: Option<&str>) -> Result<Self, ValidationError> {
        let host_override = match base_url {
            Some(url) => {
                let host = parse_base_url(url)?;
                let value = HeaderValue::from_str(&host).map_err(|e| ValidationError::InvalidUrl {
                    field: "base_url".to_string(),
                    value: url.to_string(),
                    reason: e.to_string(),
                })?;
                Some(value)
            }
            None => None,
        };
        Ok(Self::new(host_override))
    }

    /// Rewrite `request` so it targets `target`.
    pub fn apply(&self, target: &Url, request: Request<Body>) -> Result<Request<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();

        let host = match &self.host_override {
            Some(host) => Some(host.clone()),
            None => inbound_host(&parts),
        };

        parts.uri = target_uri(target, &parts.uri)?;
        parts.version = Version::HTTP_11;
        prepare_request_headers(&mut parts.headers);

        match host {
            Some(host) => {
                parts.headers.insert(header::HOST, host);
            }
            None => {
                parts.headers.remove(header::HOST);
            }
        }

        Ok(Request::from_parts(parts, body))
    }
}

/// Host as the client sent it; HTTP/2 clients carry it in the URI authority.
fn inbound_host(parts: &Parts) -> Option<HeaderValue> {
    if let Some(host) = parts.headers.get(header::HOST) {
        return Some(host.clone());
    }
    parts
        .uri
        .authority()
        .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
}

/// Backend URI for an inbound request URI.
pub fn target_uri(target: &Url, inbound: &Uri) -> Result<Uri, ProxyError> {
    let authority = &target[Position::BeforeHost..Position::AfterPort];
    let path = join_path(target.path(), inbound.path());

    let query = match (
        target.query().filter(|q| !q.is_empty()),
        inbound.query().filter(|q| !q.is_empty()),
    ) {
        (Some(t), Some(i)) => Some(format!("{}&{}", t, i)),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    };

    let mut uri = format!("{}://{}{}", target.scheme(), authority, path);
    if let Some(query) = query {
        uri.push('?');
        uri.push_str(&query);
    }
    uri.parse::<Uri>()
        .map_err(|e| ProxyError::Build(e.into()))
}

/// Join two paths with exactly one slash between them.
fn join_path(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
