use std::sync::Arc;

use anyhow::Context;
use auth::Authenticator;
use auth::PasswordHasher;
use identity_service::config::Config;
use identity_service::config::StorageBackend;
use identity_service::domain::oauth::ports::OAuthRegistryPort;
use identity_service::domain::oauth::registry::OAuthRegistry;
use identity_service::domain::session::ports::SessionStore;
use identity_service::domain::user::ports::IdentityServicePort;
use identity_service::domain::user::ports::UserStore;
use identity_service::domain::user::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::SessionCookie;
use identity_service::outbound::oauth::HttpCodeExchanger;
use identity_service::outbound::repositories::InMemorySessionStore;
use identity_service::outbound::repositories::InMemoryUserStore;
use identity_service::outbound::repositories::PostgresSessionStore;
use identity_service::outbound::repositories::PostgresUserStore;
use identity_service::outbound::system::OsRandom;
use identity_service::outbound::system::SystemClock;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        storage = ?config.storage.backend,
        issuer = %config.auth.issuer,
        oauth_providers = config.oauth.providers.len(),
        "Configuration loaded"
    );

    let password_hasher =
        PasswordHasher::new(config.auth.salt.as_bytes(), config.password.hash_cost())?;
    let authenticator = Arc::new(Authenticator::new(
        password_hasher,
        config.auth.jwt_secret.as_bytes(),
        &config.auth.issuer,
    ));

    let identity: Arc<dyn IdentityServicePort> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!(storage = "memory", "Accounts will not survive a restart");
            build_identity_service(
                &config,
                authenticator,
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemorySessionStore::new()),
            )
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .url
                .as_deref()
                .context("storage.url is required for the postgres backend")?;
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.storage.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            build_identity_service(
                &config,
                authenticator,
                Arc::new(PostgresUserStore::new(pg_pool.clone())),
                Arc::new(PostgresSessionStore::new(pg_pool)),
            )
        }
    };

    let oauth: Arc<dyn OAuthRegistryPort> = Arc::new(OAuthRegistry::new(
        config.oauth.providers()?,
        Arc::new(HttpCodeExchanger::new(reqwest::Client::new())),
        Arc::new(OsRandom),
    )?);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        identity,
        oauth,
        SessionCookie {
            name: config.auth.session_cookie.clone(),
            secure: config.auth.secure_cookie,
        },
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

fn build_identity_service<US, SS>(
    config: &Config,
    authenticator: Arc<Authenticator>,
    users: Arc<US>,
    sessions: Arc<SS>,
) -> Arc<dyn IdentityServicePort>
where
    US: UserStore,
    SS: SessionStore,
{
    Arc::new(IdentityService::new(
        users,
        sessions,
        authenticator,
        Arc::new(SystemClock),
        Arc::new(OsRandom),
        config.auth.token_policy(),
    ))
}
