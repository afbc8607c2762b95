use std::env;

use thiserror::Error;
use url::Url;

/// Connection settings for the external authorization server.
#[derive(Debug, Clone)]
pub struct WebAuthConfig {
    server_url: Url,
    client_id: String,
    hostname: Option<String>,
}

impl WebAuthConfig {
    /// Parse the authorization-server base URL and client id.
    ///
    /// The URL path is normalized to end with `/` so that endpoint segments
    /// (`auth`, `token`) always append rather than replace the last segment.
    pub fn new(
        server_url: impl AsRef<str>,
        client_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let mut server_url = Url::parse(server_url.as_ref())?;
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }
        Ok(Self {
            server_url,
            client_id: client_id.into(),
            hostname: None,
        })
    }

    /// Override the hostname used to reach the authorization server, keeping
    /// the scheme, port, and path of the configured URL.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Read the configuration from `WEBAUTH_URL`, `WEBAUTH_CLIENT_ID`, and
    /// the optional `WEBAUTH_HOSTNAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = require_var("WEBAUTH_URL")?;
        let client_id = require_var("WEBAUTH_CLIENT_ID")?;
        let mut config = Self::new(url, client_id)?;
        if let Ok(hostname) = env::var("WEBAUTH_HOSTNAME") {
            if !hostname.is_empty() {
                config = config.with_hostname(hostname);
            }
        }
        Ok(config)
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

/// Errors that can occur while assembling the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid authorization server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
