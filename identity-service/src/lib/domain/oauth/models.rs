use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

/// OAuth2 login provider.
#[derive(Clone)]
pub struct Provider {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub scopes: Vec<String>,
    /// Callback registered with the provider, sent as `redirect_uri`
    pub redirect_url: Option<Url>,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("scopes", &self.scopes)
            .field("redirect_url", &self.redirect_url.as_ref().map(Url::as_str))
            .finish()
    }
}

/// One entry of the login method listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMethod {
    pub provider: String,
    /// Opaque CSRF token embedded in `auth_url`
    pub state: String,
    pub auth_url: Url,
}

/// Token endpoint response of an OAuth2 provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}
