//! Device fingerprinting from client request metadata.
//!
//! A fingerprint binds a token to the context it was issued from: it is a
//! SHA-256 hash over the user-agent, client IP, accept-language and
//! accept-encoding of the request, base64-encoded. It raises the bar against
//! naive token replay from a different network context without requiring
//! persistent device IDs.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, header};
use data_encoding::BASE64;
use sha2::{Digest, Sha256};

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Derives a stable fingerprint from request metadata.
///
/// Returns `None` when no user-agent is present; callers must treat that as
/// "skip fingerprint enforcement", never as a hard failure.
pub fn generate(headers: &HeaderMap, client_ip: Option<&str>) -> Option<String> {
    let user_agent = header_str(headers, header::USER_AGENT);
    if user_agent.is_empty() {
        return None;
    }

    let accept_language = header_str(headers, header::ACCEPT_LANGUAGE);
    let accept_encoding = header_str(headers, header::ACCEPT_ENCODING);
    let remote_addr = client_ip.unwrap_or("");

    let combined = format!("{user_agent}|{remote_addr}|{accept_language}|{accept_encoding}");
    let digest = Sha256::digest(combined.as_bytes());

    Some(BASE64.encode(&digest))
}

/// Resolves the client IP for a request: the first `x-forwarded-for` hop
/// when present, otherwise the connection's peer address.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .and_then(|hop| hop.trim().parse().ok())
        {
            return Some(ip);
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
