//! Error types for UAA and control-plane access.

use thiserror::Error;

/// Result type alias for Cloud Foundry operations.
pub type CfResult<T> = Result<T, CfError>;

/// Longest response excerpt carried in an error.
pub const EXCERPT_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum CfError {
    /// The identity endpoint rejected the credentials or could not be reached.
    #[error("authentication against {uaa_url} failed: {reason}")]
    Auth { uaa_url: String, reason: String },

    /// The control plane answered with a non-2xx status.
    #[error("control plane {method} {status} {url}: {body_excerpt}")]
    ControlPlane {
        method: &'static str,
        status: u16,
        url: String,
        body_excerpt: String,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("application {0} not found")]
    NotFound(String),

    #[error("no process found on app {0}")]
    NoProcess(String),

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Truncate `body` to at most [`EXCERPT_LIMIT`] characters.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_LIMIT).collect()
}
