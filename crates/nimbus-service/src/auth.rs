//! Session cookie handling and the authenticated-user extractor.
//!
//! Cookie parsing lives here and nowhere else: every protected handler takes
//! an [`AuthUser`] argument, and the optional-auth handlers go through
//! [`session_token`]. No handler touches the `Cookie` header itself.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use nimbus_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "nimbus_session";

/// Extract the session token from the request's `Cookie` headers, if any.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
}

/// Build the `Set-Cookie` value for issuing a session.
#[must_use]
pub fn session_cookie(token: &str, max_age_seconds: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// An authenticated user extracted from the session cookie.
///
/// Extraction fails with [`ApiError::Unauthorized`] when the cookie is
/// missing, the token is unknown, or the session has not completed login.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The logged-in user's id.
    pub user_id: UserId,
    /// The session token the request carried.
    pub token: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

            let session = state
                .sessions
                .get(&token)
                .await
                .ok_or(ApiError::Unauthorized)?;

            // Pre-auth sessions exist but carry no user yet.
            let user_id = session.user_id.ok_or(ApiError::Unauthorized)?;

            Ok(AuthUser { user_id, token })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let headers = headers("theme=dark; nimbus_session=abc123; lang=en");
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_cookie_is_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        let headers = headers("theme=dark");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn issue_and_clear_cookie_shapes() {
        let cookie = session_cookie("abc", 604_800, false);
        assert_eq!(
            cookie,
            "nimbus_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );

        let cookie = session_cookie("abc", 3600, true);
        assert!(cookie.ends_with("; Secure"));

        let cookie = clear_session_cookie(false);
        assert!(cookie.contains("Max-Age=0"));
    }
}
