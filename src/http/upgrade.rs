//! Protocol upgrade tunnelling.
//!
//! # Responsibilities
//! - Check the backend switched to the protocol the client asked for
//! - Answer the client with 101 Switching Protocols
//! - Once both connections have switched, copy bytes in both directions
//!
//! # Data Flow
//! ```text
//! Client ←──── raw bytes ────→ Gateway ←──── raw bytes ────→ Backend
//! ```
//!
//! # Design Decisions
//! - Byte-level tunnel, frames are never parsed
//! - Either side closing ends the tunnel

use axum::{
    body::Body,
    http::{header, HeaderValue, Response as HttpResponse},
    response::Response,
};
use hyper::body::Incoming;
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

use crate::http::headers::remove_hop_by_hop;
use crate::http::response::ProxyError;

/// Turn a backend `101 Switching Protocols` into the client response and
/// spawn the tunnel between the two upgraded connections.
pub fn switch_protocols(
    requested: Option<&HeaderValue>,
    client: Option<OnUpgrade>,
    mut response: HttpResponse<Incoming>,
) -> Result<Response, ProxyError> {
    let (Some(requested), Some(client)) = (requested, client) else {
        return Err(ProxyError::UnexpectedUpgrade);
    };

    let offered = response
        .headers()
        .get(header::UPGRADE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    let wanted = requested.to_str().unwrap_or_default();
    let got = offered.to_str().unwrap_or_default();
    if got.is_empty() || !wanted.eq_ignore_ascii_case(got) {
        return Err(ProxyError::UpgradeMismatch {
            requested: wanted.to_string(),
            offered: got.to_string(),
        });
    }

    let upstream = hyper::upgrade::on(&mut response);
    tokio::spawn(async move {
        match tokio::try_join!(client, upstream) {
            Ok((client, upstream)) => {
                let mut client = TokioIo::new(client);
                let mut upstream = TokioIo::new(upstream);
                match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
                    Ok((sent, received)) => {
                        tracing::debug!(sent, received, "Upgraded connection closed");
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Upgraded connection ended with error");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Protocol upgrade failed");
            }
        }
    });

    let (mut parts, _) = response.into_parts();
    remove_hop_by_hop(&mut parts.headers);
    parts
        .headers
        .insert(header::CONNECTION, HeaderValue::from_static("upgrade"));
    parts.headers.insert(header::UPGRADE, offered);

    Ok(Response::from_parts(parts, Body::empty()))
}
