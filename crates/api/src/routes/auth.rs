//! Auth route handlers.
//!
//! Tokens travel as `HttpOnly` cookies, never in response bodies. The
//! access cookie expires with the token; the refresh cookie is scoped
//! to the refresh endpoint's lifetime via Max-Age.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, RequireAuth};
use crate::models::UserProfile;
use crate::services::auth::{AuthError, AuthService, TokenPair};
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.redis(), &state.config().tokens)
}

fn token_cookie(name: &'static str, value: String, max_age_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX)))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

/// Add both token cookies to the jar.
fn with_token_cookies(jar: CookieJar, state: &AppState, pair: TokenPair) -> CookieJar {
    let config = state.config();
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        pair.access,
        config.tokens.access_ttl.as_secs(),
        config.secure_cookies,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        pair.refresh,
        config.tokens.refresh_ttl.as_secs(),
        config.secure_cookies,
    ))
}

/// Create an account and sign the new user in.
#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    let (user, pair) = auth_service(&state)
        .signup(&payload.email, &payload.name, &payload.password)
        .await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user signed up");

    let jar = with_token_cookies(jar, &state, pair);
    Ok((StatusCode::CREATED, jar, Json(UserProfile::from(&user))))
}

/// Verify credentials and sign the user in.
#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let (user, pair) = auth_service(&state)
        .login(&payload.email, &payload.password)
        .await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user logged in");

    let jar = with_token_cookies(jar, &state, pair);
    Ok((jar, Json(UserProfile::from(&user))))
}

/// Revoke the refresh token and clear both cookies.
///
/// Succeeds even without a refresh cookie so a half-logged-out client
/// can always finish logging out.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    if let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) {
        auth_service(&state).logout(cookie.value()).await?;
    }

    clear_sentry_user();

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((
        jar,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    ))
}

/// Exchange the refresh cookie for a fresh access cookie.
#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let refresh_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(Cookie::value)
        .ok_or(AppError::Auth(AuthError::TokenMissing))?;

    let access = auth_service(&state).refresh_access(refresh_token).await?;

    let config = state.config();
    let jar = jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        access,
        config.tokens.access_ttl.as_secs(),
        config.secure_cookies,
    ));

    Ok((
        jar,
        Json(serde_json::json!({ "message": "Token refreshed successfully" })),
    ))
}

/// The signed-in user's profile.
#[instrument(skip_all)]
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}
