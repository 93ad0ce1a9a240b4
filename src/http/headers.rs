//! Header manipulation for proxied traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers on both legs
//! - Drop inbound Forwarded / X-Forwarded-* headers
//! - Carry protocol upgrade requests through to the backend
//!
//! # Design Decisions
//! - Headers named in `Connection` are hop-by-hop too
//! - `TE: trailers` survives so trailer-based protocols keep working
//! - `Connection: upgrade` + `Upgrade` are re-added after stripping when the client asked for an upgrade

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers that only apply to a single transport hop.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const FORWARDING: &[&str] = &[
    "forwarded",
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-proto",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn remove_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }

    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// True if any comma-separated token of `name` equals `token`, ignoring case.
fn has_token(headers: &HeaderMap, name: HeaderName, token: &str) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|t| t.trim().eq_ignore_ascii_case(token))
}

/// Protocol the client wants to switch to, if this is an upgrade request.
pub fn requested_upgrade(headers: &HeaderMap) -> Option<HeaderValue> {
    if !has_token(headers, header::CONNECTION, "upgrade") {
        return None;
    }
    headers.get(header::UPGRADE).cloned()
}

/// Prepare request headers for the upstream hop.
pub fn prepare_request_headers(headers: &mut HeaderMap) {
    let keep_trailers = has_token(headers, header::TE, "trailers");
    let upgrade = requested_upgrade(headers);

    remove_hop_by_hop(headers);
    for name in FORWARDING {
        headers.remove(*name);
    }

    if keep_trailers {
        headers.insert(header::TE, HeaderValue::from_static("trailers"));
    }
    if let Some(protocol) = upgrade {
        headers.insert(header::CONNECTION, HeaderValue::from_static("upgrade"));
        headers.insert(header::UPGRADE, protocol);
    }
}
