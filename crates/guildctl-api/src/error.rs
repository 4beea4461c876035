use thiserror::Error;

/// Top-level error type for the `guildctl-api` crate.
///
/// Rate limiting is handled inside the client and never surfaces here
/// except through [`Error::RateLimitExceeded`], which fires only when the
/// retry cap is exhausted under a misbehaving provider.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected (401) or missing permissions (403).
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Rate limiting ───────────────────────────────────────────────
    /// Still rate limited after the bounded retry loop gave up.
    #[error("Rate limited after {attempts} retries on {method} {path}")]
    RateLimitExceeded {
        method: String,
        path: String,
        attempts: u32,
    },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx, non-429 response, with the Discord error body when parseable.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<u32>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the failed response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::RateLimitExceeded { .. } => Some(429),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient failure a later run may clear.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimitExceeded { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
