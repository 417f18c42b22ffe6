//! Session context carried from the browser cookie to every backend call.
//!
//! The token lives in the `access_token` cookie. Handlers that need a
//! session take [`Session`] as an extractor; when the cookie is missing the
//! request is answered with a navigation to the login page before any
//! backend call is made.

use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

pub const TOKEN_COOKIE: &str = "access_token";
pub const LOGIN_PATH: &str = "/login";

const HX_REQUEST: &str = "hx-request";
const HX_REDIRECT: &str = "hx-redirect";

#[derive(Clone)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        token_from_headers(headers).map(Self::new)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match Session::from_headers(&parts.headers) {
            Some(session) => Ok(session),
            None => {
                tracing::debug!(path = %parts.uri.path(), "no session token, redirecting to login");
                Err(navigate(&parts.headers, LOGIN_PATH))
            }
        }
    }
}

/// Find the token cookie among all `Cookie` headers
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn token_cookie(token: &str, secure: bool) -> Option<HeaderValue> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax{secure}"
    ))
    .ok()
}

pub fn cleared_token_cookie() -> HeaderValue {
    HeaderValue::from_static("access_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST)
}

/// Send the browser to `to`: `HX-Redirect` for htmx requests, `303` otherwise
pub fn navigate(headers: &HeaderMap, to: &'static str) -> Response {
    let location = HeaderValue::from_static(to);
    if is_htmx(headers) {
        (StatusCode::OK, [(HX_REDIRECT, location)]).into_response()
    } else {
        (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response()
    }
}

/// Like [`navigate`], also expiring the token cookie
pub fn navigate_signed_out(headers: &HeaderMap, to: &'static str) -> Response {
    let mut response = navigate(headers, to);
    response
        .headers_mut()
        .append(SET_COOKIE, cleared_token_cookie());
    response
}
