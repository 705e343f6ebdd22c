//! Cookie names and header helpers shared by the gate and the auth routes.

use axum::http::{HeaderMap, HeaderValue, header};

/// httpOnly session token cookie (server-rendered gating transport).
pub const TOKEN_COOKIE: &str = "token";

/// Client-readable double-submit CSRF cookie.
pub const CSRF_COOKIE: &str = "csrfToken";

/// Header the CSRF cookie value must be echoed in on mutating calls.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Read a cookie value out of the `Cookie` request header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// `Set-Cookie` value for the CSRF token: client-readable by design (the
/// double-submit pattern requires same-origin script to echo it).
pub fn csrf_cookie(
    value: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{CSRF_COOKIE}={value}; Max-Age={max_age_secs}; Path=/; SameSite=Strict{}",
        secure_suffix(secure)
    ))
}

/// `Set-Cookie` value for the session token cookie.
pub fn token_cookie(
    value: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}={value}; Max-Age={max_age_secs}; Path=/; HttpOnly; SameSite=Strict{}",
        secure_suffix(secure)
    ))
}

/// `Set-Cookie` value that removes the session token cookie.
pub fn clear_token_cookie(
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict{}",
        secure_suffix(secure)
    ))
}

fn secure_suffix(secure: bool) -> &'static str {
    if secure { "; Secure" } else { "" }
}
