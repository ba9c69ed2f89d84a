use async_trait::async_trait;

use crate::domain::errors::IdentityError;
use crate::domain::oauth::errors::ExchangeError;
use crate::domain::oauth::models::AuthMethod;
use crate::domain::oauth::models::ExternalToken;
use crate::domain::oauth::models::Provider;

/// Port for the OAuth login flow.
#[async_trait]
pub trait OAuthRegistryPort: Send + Sync + 'static {
    /// One entry per configured provider, each with a fresh state.
    ///
    /// # Arguments
    /// * `redirect_url` - Where the caller wants to land after login
    fn list_auth_methods(&self, redirect_url: &str) -> Vec<AuthMethod>;

    /// Exchange an authorization code with the named provider.
    ///
    /// # Errors
    /// * `InvalidInput` - No provider with that exact name
    /// * `AuthFailed` - The exchange failed
    async fn complete_login(
        &self,
        provider: &str,
        code: &str,
    ) -> Result<ExternalToken, IdentityError>;
}

/// Authorization-code exchange against a provider's token endpoint.
#[async_trait]
pub trait CodeExchanger: Send + Sync + 'static {
    async fn exchange(&self, provider: &Provider, code: &str)
        -> Result<ExternalToken, ExchangeError>;
}
