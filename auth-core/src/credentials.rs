//! Inbound credential transport.
//!
//! Tokens arrive either as an `Authorization: Bearer <token>` header or as a
//! `token` cookie. The header wins when both are present. Extraction is
//! shared so every service accepts credentials identically.

use http::header;
use http::HeaderMap;

const COOKIE_NAME: &str = "token";
const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from request headers, if any.
///
/// Returns `None` for absent or malformed credential transports; whether a
/// missing credential is an error is the gate's decision, not this layer's.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::COOKIE)?.to_str().ok()?;

    value.split(';').find_map(|pair| {
        let (name, token) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME && !token.is_empty()).then_some(token)
    })
}
