use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::oauth::models::ExternalToken;
use crate::domain::session::models::TOKEN_TYPE;
use crate::domain::user::models::Kind;
use crate::inbound::http::router::AppState;
use crate::inbound::http::router::SessionCookie;

/// Log in with a password or by completing an OAuth2 code exchange.
///
/// A password login also sets the session cookie to the access token.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    let Json(body) = body?;

    match body {
        LoginRequestBody::Password {
            username_or_email,
            password,
            kind,
        } => {
            let user = state
                .identity
                .password_login(kind.unwrap_or(Kind::User), &username_or_email, &password)
                .await?;
            let tokens = state.identity.issue_tokens(&user).await?;

            let jar = jar.add(session_cookie(
                &state.session_cookie,
                tokens.access_token.clone(),
            ));

            Ok((
                jar,
                ApiSuccess::new(
                    StatusCode::OK,
                    LoginResponseData::Password(PasswordLoginData {
                        access_token: tokens.access_token,
                        refresh_token: tokens.refresh_token,
                        token_type: TOKEN_TYPE.to_string(),
                        expires_in: tokens.expires_in,
                        user: (&user).into(),
                    }),
                ),
            ))
        }
        LoginRequestBody::Oauth2 {
            code,
            provider,
            redirection_url,
        } => {
            tracing::debug!(
                provider = %provider,
                redirection_url = redirection_url.as_deref().unwrap_or_default(),
                "Completing OAuth login"
            );
            let token = state.oauth.complete_login(&provider, &code).await?;

            Ok((
                jar,
                ApiSuccess::new(
                    StatusCode::OK,
                    LoginResponseData::OAuth2(OAuthLoginData { provider, token }),
                ),
            ))
        }
    }
}

fn session_cookie(settings: &SessionCookie, access_token: String) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), access_token))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Login body, discriminated by `method`.
///
/// An unknown method fails to deserialize and is answered with 400.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum LoginRequestBody {
    Oauth2 {
        code: String,
        provider: String,
        #[serde(default)]
        redirection_url: Option<String>,
    },
    Password {
        username_or_email: String,
        password: String,
        #[serde(default)]
        kind: Option<Kind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoginResponseData {
    Password(PasswordLoginData),
    OAuth2(OAuthLoginData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordLoginData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthLoginData {
    pub provider: String,
    pub token: ExternalToken,
}
