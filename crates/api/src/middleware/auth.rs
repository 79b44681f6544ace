//! Authentication extractors.
//!
//! Handlers opt into authentication by taking [`RequireAuth`] (any
//! signed-in user) or [`RequireAdmin`] (admin role) as an argument. Both
//! read the access-token cookie, verify it, and load the user row so
//! handlers always see a live account.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Cookie holding the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie holding the long-lived refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     Json(UserProfile::from(&user))
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(ACCESS_TOKEN_COOKIE)
            .map(axum_extra::extract::cookie::Cookie::value)
            .ok_or(AppError::Auth(AuthError::TokenMissing))?;

        let auth = AuthService::new(state.pool(), state.redis(), &state.config().tokens);
        let user = auth.current_user(token).await?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Access denied - admin only".to_string()));
        }

        Ok(Self(user))
    }
}
