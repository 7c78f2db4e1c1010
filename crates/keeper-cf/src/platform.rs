//! Seams between the orchestrator and the Cloud Foundry platform.

use std::sync::Arc;

use async_trait::async_trait;
use keeper_core::{Credentials, RegionConfig};

use crate::auth::{AuthToken, TokenProvider};
use crate::client::ControlPlaneClient;
use crate::error::CfResult;
use crate::metadata::AppMetadata;
use crate::model::InstanceStates;

/// Typed control-plane operations for one region and token.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// GUID of the first app named `app_name`.
    async fn find_app_guid(&self, app_name: &str) -> CfResult<String>;

    /// Application lifecycle state, `UNKNOWN` when not reported.
    async fn app_state(&self, app_guid: &str) -> CfResult<String>;

    /// GUID of the `web` process, or the first process if none is typed `web`.
    async fn web_process_guid(&self, app_guid: &str) -> CfResult<String>;

    /// Per-instance states of a process; empty when nothing is reported yet.
    async fn process_instance_states(&self, process_guid: &str) -> CfResult<InstanceStates>;

    async fn restart_app(&self, app_guid: &str) -> CfResult<()>;

    async fn start_app(&self, app_guid: &str) -> CfResult<()>;

    /// Best-effort metadata; never fails.
    async fn app_metadata(&self, app_guid: &str) -> AppMetadata;
}

/// Entry point to a platform: token exchange and region-bound clients.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Exchange the operator credentials for a token valid in `region`.
    async fn authenticate(&self, region: &RegionConfig) -> CfResult<AuthToken>;

    /// A control-plane client for `region` using `token`.
    fn control_plane(&self, region: &RegionConfig, token: &AuthToken) -> Arc<dyn ControlPlane>;
}

/// The real Cloud Foundry platform.
#[derive(Debug, Clone)]
pub struct CfPlatform {
    http: reqwest::Client,
    credentials: Credentials,
    tokens: TokenProvider,
}

impl CfPlatform {
    pub fn new(credentials: Credentials) -> CfResult<Self> {
        Ok(Self::with_client(crate::http_client()?, credentials))
    }

    pub fn with_client(http: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            tokens: TokenProvider::new(http.clone()),
            http,
            credentials,
        }
    }
}

#[async_trait]
impl Platform for CfPlatform {
    async fn authenticate(&self, region: &RegionConfig) -> CfResult<AuthToken> {
        self.tokens
            .fetch_token(&self.credentials, &region.code, &region.uaa_url)
            .await
    }

    fn control_plane(&self, region: &RegionConfig, token: &AuthToken) -> Arc<dyn ControlPlane> {
        Arc::new(ControlPlaneClient::new(
            self.http.clone(),
            &region.api_url,
            token.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn platform_authenticates_then_binds_client() {
        let uaa = MockServer::start().await;
        let api = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t-ap" })))
            .mount(&uaa)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/apps/g-1"))
            .and(header("authorization", "Bearer t-ap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "STOPPED" })))
            .mount(&api)
            .await;

        let region = RegionConfig {
            code: "AP".into(),
            api_url: api.uri(),
            uaa_url: uaa.uri(),
            domain_pattern: r"\.ap21\.".into(),
        };
        let platform = CfPlatform::new(Credentials {
            email: "ops@example.com".into(),
            password: "pw".into(),
        })
        .unwrap();

        let token = platform.authenticate(&region).await.unwrap();
        assert_eq!(token.region, "AP");
        let cf = platform.control_plane(&region, &token);
        assert_eq!(cf.app_state("g-1").await.unwrap(), "STOPPED");
    }
}
