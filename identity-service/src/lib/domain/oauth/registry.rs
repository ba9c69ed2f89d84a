use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::IdentityError;
use crate::domain::oauth::models::AuthMethod;
use crate::domain::oauth::models::ExternalToken;
use crate::domain::oauth::models::Provider;
use crate::domain::oauth::ports::CodeExchanger;
use crate::domain::oauth::ports::OAuthRegistryPort;
use crate::domain::ports::RandomSource;
use crate::domain::ports::CHARSET_ALPHA_NUM;

const STATE_LENGTH: usize = 32;

/// Configured OAuth providers plus the means to complete a login with them.
///
/// State values are handed to the client and not remembered here; the client
/// compares the state echoed back by the provider.
pub struct OAuthRegistry<EX>
where
    EX: CodeExchanger,
{
    providers: Vec<Provider>,
    exchanger: Arc<EX>,
    random: Arc<dyn RandomSource>,
}

impl<EX> OAuthRegistry<EX>
where
    EX: CodeExchanger,
{
    /// # Errors
    /// * `InvalidInput` - Two providers share a name
    pub fn new(
        providers: Vec<Provider>,
        exchanger: Arc<EX>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, IdentityError> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.name.as_str()) {
                return Err(IdentityError::InvalidInput(format!(
                    "duplicate provider '{}'",
                    provider.name
                )));
            }
        }

        Ok(Self {
            providers,
            exchanger,
            random,
        })
    }

    fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name == name)
    }
}

fn authorization_url(provider: &Provider, state: &str, redirect_url: &str) -> url::Url {
    let mut url = provider.auth_url.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &provider.client_id);
        if let Some(redirect_uri) = &provider.redirect_url {
            query.append_pair("redirect_uri", redirect_uri.as_str());
        }
        if !provider.scopes.is_empty() {
            query.append_pair("scope", &provider.scopes.join(" "));
        }
        query.append_pair("state", state);
        if !redirect_url.is_empty() {
            query.append_pair("redirect_url", redirect_url);
        }
    }
    url
}

#[async_trait]
impl<EX> OAuthRegistryPort for OAuthRegistry<EX>
where
    EX: CodeExchanger,
{
    fn list_auth_methods(&self, redirect_url: &str) -> Vec<AuthMethod> {
        let redirect_url = redirect_url.trim();
        self.providers
            .iter()
            .map(|provider| {
                let state = self.random.string(STATE_LENGTH, CHARSET_ALPHA_NUM);
                AuthMethod {
                    provider: provider.name.clone(),
                    auth_url: authorization_url(provider, &state, redirect_url),
                    state,
                }
            })
            .collect()
    }

    async fn complete_login(
        &self,
        provider: &str,
        code: &str,
    ) -> Result<ExternalToken, IdentityError> {
        let provider_config = self.provider(provider).ok_or_else(|| {
            IdentityError::InvalidInput(format!("unknown provider '{}'", provider))
        })?;

        match self.exchanger.exchange(provider_config, code).await {
            Ok(token) => {
                tracing::info!(provider = %provider, "OAuth login completed");
                Ok(token)
            }
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "OAuth code exchange failed");
                Err(IdentityError::AuthFailed)
            }
        }
    }
}
