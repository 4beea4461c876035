// Hand-crafted async HTTP client for the Discord REST API (v10).
//
// Base path: https://discord.com/api/v10/
// Auth: `Authorization: Bot <token>` default header (see transport.rs)
//
// Every request funnels through `send_with_backoff`, the single point that
// understands Discord's rate-limit protocol: a 429 response carries a JSON
// body with `retry_after` in (possibly fractional) seconds; the client
// sleeps for that long and reissues the identical request. The loop is
// bounded so a misbehaving provider cannot pin the process forever — the
// cap is generous enough to never trigger under normal operation.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types;

/// Public Discord API base, versioned.
pub const API_BASE: &str = "https://discord.com/api/v10/";

/// Retry cap for the 429 backoff loop. Operational safety net, not part of
/// the rate-limit contract.
const MAX_RATE_LIMIT_RETRIES: u32 = 10;

/// Shape of a Discord error body, e.g. `{"code": 50013, "message": "Missing Permissions"}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<u32>,
}

/// Async client for the Discord REST routes used by guild provisioning.
///
/// Holds no per-guild state — guild ids are passed per call so one client
/// can serve both the reconciler and downstream member tooling.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build an authenticated client against the public Discord API.
    pub fn new(token: &SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(token, transport, API_BASE)
    }

    /// Build an authenticated client against a custom base URL.
    pub fn with_base_url(
        token: &SecretString,
        transport: &TransportConfig,
        base_url: &str,
    ) -> Result<Self, Error> {
        let http = transport.build_client(token)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Ensure the base URL ends with a slash so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Join a relative path (e.g. `"guilds/1/roles"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Issue a request, transparently absorbing 429 responses.
    ///
    /// The body is pre-serialized to a `serde_json::Value` so the identical
    /// payload can be reissued on every retry.
    async fn send_with_backoff(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            debug!(%method, %url, attempt, "sending request");

            let mut req = self.http.request(method.clone(), url.clone());
            if let Some(ref json) = body {
                req = req.json(json);
            }
            let resp = req.send().await?;

            if resp.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(resp);
            }

            let wait = resp
                .json::<types::RateLimitBody>()
                .await
                .map_or(1.0, |b| b.retry_after);
            warn!(%method, path, wait, "rate limited, backing off");
            tokio::time::sleep(Duration::from_secs_f64(wait.max(0.0))).await;
        }

        Err(Error::RateLimitExceeded {
            method: method.to_string(),
            path: path.to_owned(),
            attempts: MAX_RATE_LIMIT_RETRIES,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.send_with_backoff(Method::GET, path, None).await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let json = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        let resp = self.send_with_backoff(Method::POST, path, Some(json)).await?;
        Self::handle_response(resp).await
    }

    async fn patch_empty<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let json = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        let resp = self
            .send_with_backoff(Method::PATCH, path, Some(json))
            .await?;
        Self::handle_empty(resp).await
    }

    async fn put_empty(&self, path: &str) -> Result<(), Error> {
        let resp = self.send_with_backoff(Method::PUT, path, None).await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let (message, code) = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => (err.message.unwrap_or_else(|| status.to_string()), err.code),
            Err(_) if raw.is_empty() => (status.to_string(), None),
            Err(_) => (raw, None),
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Error::Authentication {
                status: status.as_u16(),
                message,
            };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            code,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Roles ────────────────────────────────────────────────────────

    /// All roles in the guild, in one page.
    pub async fn list_roles(&self, guild_id: &str) -> Result<Vec<types::Role>, Error> {
        self.get(&format!("guilds/{guild_id}/roles")).await
    }

    pub async fn create_role(
        &self,
        guild_id: &str,
        body: &types::CreateRole,
    ) -> Result<types::Role, Error> {
        self.post(&format!("guilds/{guild_id}/roles"), body).await
    }

    // ── Channels ─────────────────────────────────────────────────────

    /// All channels in the guild, categories included, in one page.
    pub async fn list_channels(&self, guild_id: &str) -> Result<Vec<types::Channel>, Error> {
        self.get(&format!("guilds/{guild_id}/channels")).await
    }

    pub async fn create_channel(
        &self,
        guild_id: &str,
        body: &types::CreateChannel,
    ) -> Result<types::Channel, Error> {
        self.post(&format!("guilds/{guild_id}/channels"), body)
            .await
    }

    // ── Members (consumed by downstream role-assignment tooling) ─────

    /// Set a member's nickname.
    pub async fn modify_member(
        &self,
        guild_id: &str,
        user_id: &str,
        body: &types::ModifyMember,
    ) -> Result<(), Error> {
        self.patch_empty(&format!("guilds/{guild_id}/members/{user_id}"), body)
            .await
    }

    /// Grant a role to a member. Discord answers 204 on success.
    pub async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), Error> {
        self.put_empty(&format!(
            "guilds/{guild_id}/members/{user_id}/roles/{role_id}"
        ))
        .await
    }
}
