use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::logout::clear_session_cookie;
use super::ApiError;
use crate::domain::errors::IdentityError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Change the password of the signed-in user.
///
/// Requires the current password. Revokes the refresh session and clears the
/// session cookie, so the client has to log in again.
pub async fn reset_password(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    jar: CookieJar,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let Json(body) = body?;

    state
        .identity
        .password_login(user.kind, user.username.as_str(), &body.current_password)
        .await
        .map_err(|e| match e {
            IdentityError::AuthFailed => {
                ApiError::Unauthorized("Current password is incorrect".to_string())
            }
            other => ApiError::from(other),
        })?;

    state
        .identity
        .reset_password(user.kind, &user.id, &body.new_password)
        .await?;

    Ok((clear_session_cookie(jar, &state.session_cookie), StatusCode::NO_CONTENT))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    current_password: String,
    new_password: String,
}
