//! Session-token extraction from upstream `Set-Cookie` headers.
//!
//! When a login round-trip succeeds, the backend establishes its session via
//! a `Set-Cookie: AuthSession=...` response header. The gateway lifts that
//! value into the JSON body as `bearerToken` so clients can carry session
//! continuity in an `Authorization: Bearer` header instead of a cookie jar,
//! and the raw cookie never reaches the client.

use axum::http::Method;

use crate::http::headers::AUTH_COOKIE;

/// Path of the session-establishment endpoint, as seen by the client.
pub const SESSION_PATH: &str = "/hoodie/_session";

/// Whether a request is a session-establishment round-trip whose response
/// should be inspected for a session cookie.
pub fn is_session_login(method: &Method, path: &str) -> bool {
    method == Method::POST && path == SESSION_PATH
}

/// Extract the value of the `AuthSession` cookie from a raw `Set-Cookie`
/// line.
///
/// The line is tokenized over `;`-separated `name=value` attributes rather
/// than pattern-matched, so the cookie is found regardless of attribute
/// order and of whether a trailing `;` is present.
pub fn auth_session_value(set_cookie: &str) -> Option<&str> {
    set_cookie.split(';').find_map(|attribute| {
        let (name, value) = attribute.split_once('=')?;
        (name.trim() == AUTH_COOKIE).then(|| value.trim())
    })
}
