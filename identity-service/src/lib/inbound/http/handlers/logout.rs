use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::inbound::http::router::SessionCookie;

/// Revoke the refresh session and clear the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.identity.revoke_tokens(user.kind, &user.id).await?;

    Ok((clear_session_cookie(jar, &state.session_cookie), StatusCode::NO_CONTENT))
}

pub(super) fn clear_session_cookie(jar: CookieJar, settings: &SessionCookie) -> CookieJar {
    jar.remove(Cookie::build((settings.name.clone(), "")).path("/"))
}
