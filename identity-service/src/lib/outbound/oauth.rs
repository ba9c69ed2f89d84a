use async_trait::async_trait;

use crate::domain::oauth::errors::ExchangeError;
use crate::domain::oauth::models::ExternalToken;
use crate::domain::oauth::models::Provider;
use crate::domain::oauth::ports::CodeExchanger;

/// Authorization-code exchange over HTTP form posts.
#[derive(Debug, Clone, Default)]
pub struct HttpCodeExchanger {
    http: reqwest::Client,
}

impl HttpCodeExchanger {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CodeExchanger for HttpCodeExchanger {
    async fn exchange(
        &self,
        provider: &Provider,
        code: &str,
    ) -> Result<ExternalToken, ExchangeError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
        ];
        if let Some(redirect_uri) = &provider.redirect_url {
            form.push(("redirect_uri", redirect_uri.as_str()));
        }

        let response = self
            .http
            .post(provider.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ExternalToken>()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(e.to_string()))
    }
}
