use axum::body::to_bytes;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub identity_url: String,
    pub content_url: String,
}

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Request headers forwarded verbatim. The credential headers pass through
/// untouched; the gateway never inspects or rewrites them.
const FORWARDED_REQUEST_HEADERS: [header::HeaderName; 3] = [
    header::AUTHORIZATION,
    header::COOKIE,
    header::CONTENT_TYPE,
];

/// Response headers relayed back to the caller. `Set-Cookie` must survive
/// the hop or the session cookie never reaches the browser.
const FORWARDED_RESPONSE_HEADERS: [header::HeaderName; 2] =
    [header::CONTENT_TYPE, header::SET_COOKIE];

/// Pick the backend for a request path, or `None` when no backend owns it.
fn upstream_for<'a>(state: &'a AppState, path: &str) -> Option<&'a str> {
    if path.starts_with("/api/auth") || path.starts_with("/api/accounts") {
        return Some(&state.identity_url);
    }
    if path.starts_with("/api/catalog") || path.starts_with("/api/lessons") {
        return Some(&state.content_url);
    }
    None
}

/// Transparent reverse proxy.
///
/// Forwards method, path, query, body, and credential headers verbatim and
/// relays the backend's response. Issues no tokens, validates nothing, and
/// caches nothing; each backend runs its own validation.
pub async fn proxy(State(state): State<AppState>, req: Request) -> Response {
    let Some(base) = upstream_for(&state, req.uri().path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let url = format!("{base}{path_and_query}");

    let method = req.method().clone();
    let headers = req.headers().clone();

    let body = match to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Refusing oversized or unreadable request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let mut upstream_request = state.client.request(method, &url).body(body);
    for name in FORWARDED_REQUEST_HEADERS {
        for value in headers.get_all(&name) {
            upstream_request = upstream_request.header(&name, value);
        }
    }

    let upstream_response = match upstream_request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Upstream request failed");
            return (StatusCode::BAD_GATEWAY, "Upstream unavailable").into_response();
        }
    };

    let status = upstream_response.status();
    let mut response_headers = HeaderMap::new();
    for name in FORWARDED_RESPONSE_HEADERS {
        for value in upstream_response.headers().get_all(&name) {
            response_headers.append(name.clone(), value.clone());
        }
    }

    match upstream_response.bytes().await {
        Ok(bytes) => (status, response_headers, bytes).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read upstream response");
            (StatusCode::BAD_GATEWAY, "Upstream unavailable").into_response()
        }
    }
}
