//! Outbound header translation for the proxy leg.
//!
//! # Responsibilities
//! - Rebuild the upstream `cookie` header from the client's bearer token
//! - Strip `accept-encoding` so the backend replies uncompressed
//! - Rewrite `host` to the backend authority
//! - Resolve the upstream URL from the backend base and the request path
//!
//! # Design Decisions
//! - Pure functions over `HeaderMap`; no I/O, trivially unit-testable
//! - A stale client `cookie` is always discarded, even when no bearer token
//!   replaces it; the upstream only ever sees credentials derived from the
//!   current `authorization` header

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::config::BackendConfig;

/// Prefix of an `Authorization` header carrying a bearer token.
const BEARER_PREFIX: &str = "Bearer ";

/// Path prefix under which the API is mounted; stripped on the upstream leg.
pub const MOUNT_PREFIX: &str = "/hoodie";

/// Name of the session cookie the backend issues and consumes.
pub const AUTH_COOKIE: &str = "AuthSession";

/// Rewrite an inbound header map into the set sent upstream.
///
/// Re-running this on already-translated headers is a no-op beyond
/// re-stripping `cookie`/`accept-encoding` and re-setting `host`.
pub fn translate_request(headers: &mut HeaderMap, backend: &BackendConfig) {
    let token = bearer_token(headers);

    headers.remove(header::COOKIE);
    if let Some(token) = token {
        if let Ok(value) = HeaderValue::from_str(&format!("{}={}", AUTH_COOKIE, token)) {
            headers.insert(header::COOKIE, value);
        }
    }

    // The backend must not compress bodies the gateway parses as JSON.
    headers.remove(header::ACCEPT_ENCODING);

    if let Ok(value) = HeaderValue::from_str(&backend.host_header()) {
        headers.insert(header::HOST, value);
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::to_owned)
}

/// Resolve the upstream URL for a request path-and-query.
///
/// The leading mount prefix is stripped; an empty remainder (the path was
/// exactly the mount prefix) resolves to the backend root. The query string
/// is carried through unchanged.
pub fn upstream_url(base: &Url, path_and_query: &str) -> Url {
    let remainder = path_and_query
        .strip_prefix(MOUNT_PREFIX)
        .unwrap_or(path_and_query);

    // `base` is validated at startup and always ends in "/", so joining a
    // rooted or empty remainder cannot fail.
    base.join(remainder).unwrap_or_else(|_| base.clone())
}
