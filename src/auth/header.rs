//! Bearer token parsing.

use axum::http::{HeaderMap, header};

const BEARER_SCHEME: &str = "Bearer";

/// Extract the bearer token from the Authorization header.
/// Surrounding whitespace is ignored; an empty token counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix(BEARER_SCHEME) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };
    if token.is_empty() { None } else { Some(token) }
}
