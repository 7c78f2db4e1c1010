//! Public reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// Hard timeout for a single reachability check.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The URL answered exactly `200 OK`.
    Healthy,
    /// The URL answered with any other status.
    Unhealthy,
    /// The request could not complete (connection error or timeout).
    Failed,
}

/// Binary reachability check used to decide on remediation.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `true` iff the URL is reachable and answers `200`. Never fails.
    async fn is_healthy(&self, url: &str) -> bool;
}

/// [`HealthProbe`] backed by an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("cfkeeper-health/0.1")
            .build()?;
        Ok(Self { client })
    }

    /// Probe `url` once.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                debug!(%url, status = %resp.status(), "health probe ok");
                ProbeResult::Healthy
            }
            Ok(resp) => {
                debug!(%url, status = %resp.status(), "health probe non-200");
                ProbeResult::Unhealthy
            }
            Err(e) if e.is_timeout() => {
                debug!(%url, "health probe timed out");
                ProbeResult::Failed
            }
            Err(e) => {
                debug!(%url, error = %e, "health probe request failed");
                ProbeResult::Failed
            }
        }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn is_healthy(&self, url: &str) -> bool {
        self.probe(url).await == ProbeResult::Healthy
    }
}
