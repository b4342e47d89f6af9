//! Generic reverse-proxy handler for the `/hoodie` API surface.
//!
//! # Responsibilities
//! - Resolve the upstream URL (mount prefix stripped, query preserved)
//! - Translate headers on the outbound leg (see [`crate::http::headers`])
//! - Forward the request with a bounded timeout, exactly once (no retries)
//! - Post-process the upstream response: parse JSON bodies, lift the
//!   session cookie into `bearerToken` on login responses
//!
//! # Design Decisions
//! - The full upstream body is collected before anything is sent to the
//!   client; token extraction only runs on a complete body
//! - Every per-request failure becomes an HTTP 500 carrying the error text;
//!   nothing here can crash the process

use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{OriginalUri, Request, State},
    http::{header, response::Parts, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::http::headers::translate_request;
use crate::http::middleware::SpaFallbackExempt;
use crate::http::server::AppState;
use crate::http::{headers, session};

/// Header name for request ID
const X_REQUEST_ID: &str = "x-request-id";

/// JSON field added to a successful login response body.
const BEARER_TOKEN_FIELD: &str = "bearerToken";

/// A failed proxy exchange. Every variant surfaces to the client as a 500
/// with the error text in a JSON body.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(hyper_util::client::legacy::Error),

    #[error("upstream request timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("failed to build upstream request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    #[error("failed to read upstream response body: {0}")]
    ReadBody(axum::Error),

    #[error("upstream body is not valid JSON: {0}")]
    DecodeBody(#[from] serde_json::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Proxy request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Forward a request to the backend and translate both legs.
pub async fn proxy_handler(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = original_uri.path().to_string();
    let path_and_query = original_uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let target = headers::upstream_url(&state.backend_base, path_and_query);

    let mut outbound = parts.headers.clone();
    translate_request(&mut outbound, &state.config.backend);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        outbound.insert(X_REQUEST_ID, value);
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        target = %target,
        "Proxying request"
    );

    let mut upstream_request = axum::http::Request::builder()
        .method(method.clone())
        .uri(target.as_str())
        .body(body)?;
    *upstream_request.headers_mut() = outbound;

    let timeout = Duration::from_secs(state.config.timeouts.upstream_secs);
    let upstream_response = tokio::time::timeout(timeout, state.client.request(upstream_request))
        .await
        .map_err(|_| ProxyError::UpstreamTimeout(timeout))?
        .map_err(ProxyError::Upstream)?;

    let (response_parts, response_body) = upstream_response.into_parts();
    let bytes = to_bytes(
        Body::new(response_body),
        state.config.limits.max_body_bytes,
    )
    .await
    .map_err(ProxyError::ReadBody)?;

    let mut response = finish_response(&method, &path, response_parts, bytes)?;
    // Proxied responses carry the backend's own 404s; the SPA fallback must
    // leave those untouched.
    response.extensions_mut().insert(SpaFallbackExempt);
    Ok(response)
}

/// Build the client-visible response from a collected upstream response.
///
/// JSON bodies are parsed and re-serialized; a login response additionally
/// has its session cookie lifted into the body as `bearerToken` and the
/// `set-cookie` header withheld from the client.
fn finish_response(
    method: &Method,
    original_path: &str,
    mut parts: Parts,
    bytes: Bytes,
) -> Result<Response, ProxyError> {
    if bytes.is_empty() || !is_json(&parts.headers) {
        return Ok(Response::from_parts(parts, Body::from(bytes)));
    }

    let mut payload: Value = serde_json::from_slice(&bytes)?;

    if session::is_session_login(method, original_path)
        && parts.headers.contains_key(header::SET_COOKIE)
    {
        let token = parts
            .headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(session::auth_session_value)
            .map(str::to_owned);

        if let (Some(token), Value::Object(fields)) = (token, &mut payload) {
            tracing::debug!("Session established, returning bearer token to client");
            fields.insert(BEARER_TOKEN_FIELD.to_owned(), Value::String(token));
        }

        // The raw session cookie stays between the gateway and the backend.
        parts.headers.remove(header::SET_COOKIE);
    }

    let body = serde_json::to_vec(&payload)?;

    // Framing headers from the upstream no longer match the re-serialized
    // body; the server recomputes them.
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::TRANSFER_ENCODING);

    Ok(Response::from_parts(parts, Body::from(body)))
}

/// Whether the upstream declared a JSON body.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json") || value.contains("+json"))
}
