// Transport configuration for building the authenticated reqwest::Client.
//
// The bot token is injected as a default `Authorization: Bot <token>` header
// so every request carries it without the call sites touching the secret.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("guildctl/", env!("CARGO_PKG_VERSION"));

/// Transport settings shared by every request the client issues.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a `reqwest::Client` carrying the bot credential on every call.
    pub fn build_client(&self, token: &SecretString) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bot {}", token.expose_secret())).map_err(
            |e| Error::Authentication {
                status: 0,
                message: format!("invalid token header value: {e}"),
            },
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
