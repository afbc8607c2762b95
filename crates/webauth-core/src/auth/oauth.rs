use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::WebAuthConfig;

use super::AuthError;

const DEFAULT_USER_AGENT: &str = "webauth-rs/0.1.0";

/// Talks to the authorization server: builds the authorization redirect URL
/// and exchanges callback codes for access tokens.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    config: WebAuthConfig,
}

impl OAuthClient {
    pub fn new(config: WebAuthConfig) -> Result<Self, AuthError> {
        let http = Client::builder().user_agent(DEFAULT_USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    /// Build the client from `WEBAUTH_*` environment variables.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::new(WebAuthConfig::from_env()?)
    }

    pub fn config(&self) -> &WebAuthConfig {
        &self.config
    }

    /// Authorization endpoint with `client_id` and `state` query parameters.
    pub fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = self.endpoint("auth")?;
        url.query_pairs_mut()
            .append_pair("client_id", self.config.client_id())
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The token endpoint signals success with 201 Created; any other status
    /// (200 included) yields `Ok(None)` and the caller keeps whatever token
    /// it had. Transport and parse failures propagate.
    pub async fn exchange_code(&self, code: &str) -> Result<Option<String>, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id()),
        ];

        let response = self
            .http
            .post(self.endpoint("token")?)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::debug!(status = %status, "token endpoint declined code exchange");
            return Ok(None);
        }

        let body = response.text().await?;
        let payload: TokenResponse = serde_json::from_str(&body)?;
        Ok(Some(payload.access_token))
    }

    /// Resolve an endpoint segment against the configured base URL, applying
    /// the hostname override when one is set (scheme, port, and path of the
    /// configured URL are kept).
    fn endpoint(&self, segment: &str) -> Result<Url, AuthError> {
        let mut base = self.config.server_url().clone();
        if let Some(hostname) = self.config.hostname() {
            base.set_host(Some(hostname))?;
        }
        Ok(base.join(segment)?)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}
