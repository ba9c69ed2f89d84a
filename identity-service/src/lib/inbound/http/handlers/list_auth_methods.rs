use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::oauth::models::AuthMethod;
use crate::inbound::http::router::AppState;

pub async fn list_auth_methods(
    State(state): State<AppState>,
    Query(query): Query<AuthMethodsQuery>,
) -> ApiSuccess<AuthMethodsResponseData> {
    let redirect_url = query.redirect_url.unwrap_or_default();
    let auth_providers = state
        .oauth
        .list_auth_methods(&redirect_url)
        .into_iter()
        .map(AuthProviderData::from)
        .collect();

    ApiSuccess::new(StatusCode::OK, AuthMethodsResponseData { auth_providers })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthMethodsQuery {
    redirect_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthMethodsResponseData {
    pub auth_providers: Vec<AuthProviderData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthProviderData {
    pub name: String,
    pub state: String,
    pub auth_url: String,
}

impl From<AuthMethod> for AuthProviderData {
    fn from(method: AuthMethod) -> Self {
        Self {
            name: method.provider,
            state: method.state,
            auth_url: method.auth_url.to_string(),
        }
    }
}
