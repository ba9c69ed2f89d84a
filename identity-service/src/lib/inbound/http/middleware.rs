use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::handlers::ApiError;
use crate::domain::session::context;
use crate::domain::session::context::RequestContext;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor for handlers that require a signed-in user.
///
/// Rejects with 401 when the request context is anonymous.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(RequestContext::user)
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Middleware that resolves the request credential into a `RequestContext`.
///
/// Runs on every route. Missing or rejected credentials leave the request
/// anonymous; only internal failures abort it.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = find_token(req.headers(), &jar, &state.session_cookie.name);

    let request_context = context::authenticate(
        state.identity.as_ref(),
        &RequestContext::anonymous(),
        token.as_deref(),
    )
    .await?;

    req.extensions_mut().insert(request_context);

    Ok(next.run(req).await)
}

/// Bearer header first, then the session cookie. Trimmed.
fn find_token(headers: &HeaderMap, jar: &CookieJar, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    let token = match bearer {
        Some(token) => token.trim().to_string(),
        None => jar.get(cookie_name)?.value().trim().to_string(),
    };

    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    use super::*;

    const COOKIE: &str = "identity_session";

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(authorization).unwrap(),
        );
        headers
    }

    #[test]
    fn test_find_token_from_header() {
        let token = find_token(&headers("Bearer  abc.def.ghi "), &CookieJar::new(), COOKIE);
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_find_token_header_wins_over_cookie() {
        let jar = CookieJar::new().add(Cookie::new(COOKIE, "from-cookie"));

        let token = find_token(&headers("Bearer from-header"), &jar, COOKIE);
        assert_eq!(token.as_deref(), Some("from-header"));
    }

    #[test]
    fn test_find_token_falls_back_to_cookie() {
        let jar = CookieJar::new().add(Cookie::new(COOKIE, " from-cookie "));

        assert_eq!(
            find_token(&HeaderMap::new(), &jar, COOKIE).as_deref(),
            Some("from-cookie")
        );
        assert_eq!(
            find_token(&headers("Basic dXNlcjpwYXNz"), &jar, COOKIE).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_find_token_blank_is_none() {
        assert_eq!(find_token(&headers("Bearer    "), &CookieJar::new(), COOKIE), None);
        assert_eq!(find_token(&HeaderMap::new(), &CookieJar::new(), COOKIE), None);
    }
}
