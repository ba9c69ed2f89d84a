use std::env;

use auth::HashCost;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use url::Url;

use crate::domain::oauth::models::Provider;
use crate::domain::user::service::TokenPolicy;

/// Application configuration for identity-service.
///
/// Loaded from configuration files with environment variable overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Token and password secrets plus session cookie settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Service-wide secret mixed into every password hash
    pub salt: String,
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_hours: i64,
    pub session_cookie: String,
    #[serde(default)]
    pub secure_cookie: bool,
}

impl AuthConfig {
    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy {
            access_ttl: Duration::minutes(self.access_token_ttl_minutes),
            refresh_ttl: Duration::hours(self.refresh_token_ttl_hours),
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

impl PasswordConfig {
    pub fn hash_cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OAuthConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl OAuthConfig {
    /// Parse every configured provider.
    pub fn providers(&self) -> Result<Vec<Provider>, ConfigError> {
        self.providers
            .iter()
            .cloned()
            .map(ProviderConfig::into_provider)
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl ProviderConfig {
    pub fn into_provider(self) -> Result<Provider, ConfigError> {
        let parse = |field: &str, value: &str| {
            Url::parse(value).map_err(|e| {
                ConfigError::Message(format!(
                    "oauth provider '{}': invalid {} '{}': {}",
                    self.name, field, value, e
                ))
            })
        };

        let auth_url = parse("auth_url", &self.auth_url)?;
        let token_url = parse("token_url", &self.token_url)?;
        let redirect_url = match self.redirect_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Some(parse("redirect_url", url)?),
            _ => None,
        };

        Ok(Provider {
            name: self.name,
            client_id: self.client_id,
            client_secret: self.client_secret,
            auth_url,
            token_url,
            scopes: self.scopes,
            redirect_url,
        })
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__JWT_SECRET, STORAGE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // STORAGE__URL=postgres://... overrides storage.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
