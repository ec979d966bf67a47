//! Discord OAuth flow and session lifecycle handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use nimbus_core::{UserId, UserProfile};

use crate::auth::{clear_session_cookie, session_cookie, session_token};
use crate::discord::DiscordClient;
use crate::error::ApiError;
use crate::session::{random_hex, SessionData};
use crate::state::AppState;

/// Bytes of randomness in the OAuth anti-forgery state value.
const STATE_BYTES: usize = 16;

/// Initiate the Discord OAuth flow.
///
/// Issues a short-lived pre-auth session carrying the anti-forgery state and
/// redirects to Discord's authorization page.
pub async fn login(State(app): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let Some(discord) = &app.discord else {
        return Err(ApiError::Internal("Discord OAuth is not configured".into()));
    };

    let oauth_state = random_hex(STATE_BYTES);
    let url = discord.authorize_url(&oauth_state);

    let token = app
        .sessions
        .create(SessionData {
            oauth_state: Some(oauth_state),
            ..SessionData::default()
        })
        .await;

    let cookie = session_cookie(
        &token,
        app.config.preauth_max_age_seconds,
        app.config.is_production(),
    );

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(&url)).into_response())
}

/// Query parameters Discord appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code, present on success.
    pub code: Option<String>,
    /// Echoed anti-forgery state.
    pub state: Option<String>,
    /// Error code, present when the user denied access.
    pub error: Option<String>,
}

/// Complete the Discord OAuth flow.
///
/// Verifies the anti-forgery state against the pre-auth session, exchanges
/// the code, upserts the user, and issues a fresh logged-in session. Every
/// failure redirects back to the site with an error reason; this endpoint
/// never renders JSON.
pub async fn callback(
    State(app): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Discord reported an authorization error");
        return Redirect::to("/?error=discord_auth_failed").into_response();
    }

    let Some(code) = query.code else {
        return Redirect::to("/?error=no_code").into_response();
    };

    let Some(discord) = app.discord.clone() else {
        return Redirect::to("/?error=oauth_not_configured").into_response();
    };

    // The state Discord echoes back must match the one stored in the
    // pre-auth session; anything else is a forged or replayed callback.
    let preauth_token = session_token(&headers);
    let stored_state = match &preauth_token {
        Some(token) => app.sessions.get(token).await.and_then(|s| s.oauth_state),
        None => None,
    };
    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("OAuth state mismatch on callback");
        return Redirect::to("/?error=state_mismatch").into_response();
    }

    match complete_login(&app, &discord, &code).await {
        Ok(token) => {
            // The pre-auth session has served its purpose; the logged-in
            // session gets a fresh token.
            if let Some(preauth) = preauth_token {
                app.sessions.delete(&preauth).await;
            }

            let cookie = session_cookie(
                &token,
                app.config.session_max_age_seconds,
                app.config.is_production(),
            );
            (
                AppendHeaders([(SET_COOKIE, cookie)]),
                Redirect::to("/?login=success"),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Redirect::to("/?error=auth_failed").into_response()
        }
    }
}

/// Exchange the code, sync the profile, and create the logged-in session.
async fn complete_login(
    app: &AppState,
    discord: &DiscordClient,
    code: &str,
) -> Result<String, ApiError> {
    let tokens = discord.exchange_code(code).await?;
    let profile = discord.fetch_user(&tokens.access_token).await?;
    let avatar_url = discord.avatar_url(&profile);

    let user_id: UserId = profile
        .id
        .parse()
        .map_err(|_| ApiError::UpstreamAuth("provider returned a malformed user id".into()))?;

    let user = app
        .store
        .upsert_user(&UserProfile {
            id: user_id,
            username: profile.username,
            email: profile.email,
            avatar_url: Some(avatar_url),
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    let token = app
        .sessions
        .create(SessionData {
            user_id: Some(user.id),
            username: Some(user.username),
            email: user.email,
            avatar_url: user.avatar_url,
            access_token: Some(tokens.access_token),
            refresh_token: tokens.refresh_token,
            oauth_state: None,
        })
        .await;

    Ok(token)
}

/// Authentication status response.
#[derive(Debug, Serialize)]
pub struct AuthStatus {
    /// Whether the request carried a live logged-in session.
    pub authenticated: bool,
    /// The user, present only when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// The user fields exposed to the frontend.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User id.
    pub id: String,
    /// Username.
    pub username: String,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Current balance.
    pub balance: i64,
}

fn anonymous() -> Json<AuthStatus> {
    Json(AuthStatus {
        authenticated: false,
        user: None,
    })
}

/// Report the current user, or `{"authenticated": false}`.
///
/// Unlike the protected `/api/user/*` endpoints this never returns 401; an
/// absent or stale session is a normal answer here.
pub async fn current_user(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AuthStatus>, ApiError> {
    let Some(token) = session_token(&headers) else {
        return Ok(anonymous());
    };
    let Some(session) = app.sessions.get(&token).await else {
        return Ok(anonymous());
    };
    let Some(user_id) = session.user_id else {
        return Ok(anonymous());
    };
    let Some(user) = app.store.get_user(&user_id).await? else {
        return Ok(anonymous());
    };

    Ok(Json(AuthStatus {
        authenticated: true,
        user: Some(UserSummary {
            id: user.id.to_string(),
            username: user.username,
            avatar: user.avatar_url,
            email: user.email,
            balance: user.balance,
        }),
    }))
}

/// Delete the session and clear the cookie.
pub async fn logout(State(app): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        if app.sessions.delete(&token).await {
            tracing::debug!("Session deleted on logout");
        }
    }

    let cookie = clear_session_cookie(app.config.is_production());
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(serde_json::json!({ "success": true })),
    )
}
