//! Request and response middleware.
//!
//! # Responsibilities
//! - Gzip negotiation override (`?force_gzip=true`)
//! - SPA fallback: substitute the entry document for HTML-accepting 404s

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;

/// Query parameter that forces gzip response encoding.
const FORCE_GZIP_PARAM: &str = "force_gzip";

/// Marker extension for responses the SPA fallback must leave untouched.
///
/// Proxied and synthetic responses own their 404s; only framework-level
/// 404s (static lookup misses, unmatched routes) are eligible for
/// substitution.
#[derive(Debug, Clone, Copy)]
pub struct SpaFallbackExempt;

/// Treat the request as gzip-capable when `force_gzip=true`, regardless of
/// what `Accept-Encoding` declared.
///
/// Some intermediary proxies drop or mangle the negotiation header; this
/// lets clients opt back in explicitly. Runs before the compression layer
/// so the rewritten header drives its negotiation. Purely additive, never
/// rejects.
pub async fn force_gzip_override(mut request: Request, next: Next) -> Response {
    if has_force_gzip(request.uri().query()) {
        request
            .headers_mut()
            .insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    }
    next.run(request).await
}

fn has_force_gzip(query: Option<&str>) -> bool {
    query.is_some_and(|query| {
        query
            .split('&')
            .any(|pair| pair.split_once('=') == Some((FORCE_GZIP_PARAM, "true")))
    })
}

/// Serve the app shell for every 404 on an HTML page.
///
/// Hard navigations to client-side-routed paths (`/settings`, `/todos/42`)
/// miss the static tree; substituting `index.html` lets the client router
/// take over. Non-HTML clients keep the bare 404.
pub async fn spa_fallback(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let wants_html = accepts_html(request.headers().get(header::ACCEPT));
    let response = next.run(request).await;

    if response.status() != StatusCode::NOT_FOUND
        || !wants_html
        || response.extensions().get::<SpaFallbackExempt>().is_some()
    {
        return response;
    }

    let index_file = state.config.assets.index_file();
    match tokio::fs::read(&index_file).await {
        Ok(contents) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )],
            contents,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(
                path = %index_file.display(),
                error = %e,
                "Failed to read SPA entry document"
            );
            response
        }
    }
}

fn accepts_html(accept: Option<&HeaderValue>) -> bool {
    accept
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("text/html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_gzip_requires_exact_true() {
        assert!(has_force_gzip(Some("force_gzip=true")));
        assert!(has_force_gzip(Some("a=1&force_gzip=true&b=2")));
        assert!(!has_force_gzip(Some("force_gzip=1")));
        assert!(!has_force_gzip(Some("force_gzip")));
        assert!(!has_force_gzip(Some("other=true")));
        assert!(!has_force_gzip(None));
    }

    #[test]
    fn html_detection_is_a_substring_match() {
        let header = HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9");
        assert!(accepts_html(Some(&header)));

        let header = HeaderValue::from_static("application/json");
        assert!(!accepts_html(Some(&header)));

        assert!(!accepts_html(None));
    }
}
