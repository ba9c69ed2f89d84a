use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_current_user::get_current_user;
use super::handlers::list_auth_methods::list_auth_methods;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::update_profile::update_profile;
use super::middleware::authenticate as auth_middleware;
use crate::domain::oauth::ports::OAuthRegistryPort;
use crate::domain::user::ports::IdentityServicePort;

/// Name and flags of the cookie carrying the access token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityServicePort>,
    pub oauth: Arc<dyn OAuthRegistryPort>,
    pub session_cookie: SessionCookie,
}

pub fn create_router(
    identity: Arc<dyn IdentityServicePort>,
    oauth: Arc<dyn OAuthRegistryPort>,
    session_cookie: SessionCookie,
) -> Router {
    let state = AppState {
        identity,
        oauth,
        session_cookie,
    };

    let auth_routes = Router::new()
        .route("/auth/methods", get(list_auth_methods))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout));

    let user_routes = Router::new()
        .route("/users/me", get(get_current_user).patch(update_profile))
        .route("/users/me/password", post(reset_password));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
