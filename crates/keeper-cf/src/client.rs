//! Bearer-authenticated JSON client for the v3 control-plane API.

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::AuthToken;
use crate::error::{CfError, CfResult, excerpt};
use crate::metadata::AppMetadata;
use crate::model::{
    AppResource, InstanceStates, OrganizationResource, ProcessResource, ProcessStat,
    ResourceList, SpaceResource,
};
use crate::platform::ControlPlane;

/// Control-plane client bound to one region's API and token.
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    http: reqwest::Client,
    api_url: String,
    token: AuthToken,
}

impl ControlPlaneClient {
    pub fn new(http: reqwest::Client, api_url: &str, token: AuthToken) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// GET `url`; an empty body decodes as `{}`.
    pub async fn get_json(&self, url: &str) -> CfResult<Value> {
        self.send(Method::GET, url, None).await
    }

    /// POST `url` with an optional JSON body.
    pub async fn post_json(&self, url: &str, body: Option<&Value>) -> CfResult<Value> {
        self.send(Method::POST, url, body).await
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> CfResult<Value> {
        let method_name = if method == Method::POST { "POST" } else { "GET" };
        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.token.bearer);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| CfError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|source| CfError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(CfError::ControlPlane {
                method: method_name,
                status: status.as_u16(),
                url: url.to_string(),
                body_excerpt: excerpt(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|e| CfError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> CfResult<T> {
        let value = self.get_json(url).await?;
        serde_json::from_value(value).map_err(|e| CfError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn processes(&self, app_guid: &str) -> CfResult<Vec<ProcessResource>> {
        let url = self.endpoint(&format!("/v3/apps/{app_guid}/processes"));
        let list: ResourceList<ProcessResource> = self.get(&url).await?;
        Ok(list.resources)
    }

    async fn try_app_metadata(&self, app_guid: &str) -> CfResult<AppMetadata> {
        let processes = self.processes(app_guid).await?;
        let web = processes
            .iter()
            .find(|p| p.process_type.as_deref() == Some("web"));
        let mut meta = AppMetadata {
            memory_mb: web.and_then(|p| p.memory_in_mb),
            disk_mb: web.and_then(|p| p.disk_in_mb),
            ..AppMetadata::unknown()
        };

        let app: AppResource = self.get(&self.endpoint(&format!("/v3/apps/{app_guid}"))).await?;
        let Some(space_guid) = app.relationships.as_ref().and_then(|r| r.space_guid()) else {
            return Ok(meta);
        };

        let space: SpaceResource = self
            .get(&self.endpoint(&format!("/v3/spaces/{space_guid}")))
            .await?;
        meta.space = space.name.clone();

        if let Some(org_guid) = space.relationships.as_ref().and_then(|r| r.organization_guid()) {
            let org: OrganizationResource = self
                .get(&self.endpoint(&format!("/v3/organizations/{org_guid}")))
                .await?;
            meta.org = org.name;
        }

        Ok(meta)
    }
}

#[async_trait]
impl ControlPlane for ControlPlaneClient {
    async fn find_app_guid(&self, app_name: &str) -> CfResult<String> {
        let url = Url::parse_with_params(&self.endpoint("/v3/apps"), &[("names", app_name)])
            .map_err(|e| CfError::Decode {
                url: self.endpoint("/v3/apps"),
                reason: e.to_string(),
            })?;
        let list: ResourceList<AppResource> = self.get(url.as_str()).await?;
        let app = list
            .resources
            .into_iter()
            .next()
            .ok_or_else(|| CfError::NotFound(app_name.to_string()))?;
        debug!(app = %app_name, guid = %app.guid, "resolved app guid");
        Ok(app.guid)
    }

    async fn app_state(&self, app_guid: &str) -> CfResult<String> {
        let app: AppResource = self.get(&self.endpoint(&format!("/v3/apps/{app_guid}"))).await?;
        Ok(app.state.unwrap_or_else(|| "UNKNOWN".to_string()))
    }

    async fn web_process_guid(&self, app_guid: &str) -> CfResult<String> {
        let mut processes = self.processes(app_guid).await?;
        let index = processes
            .iter()
            .position(|p| p.process_type.as_deref() == Some("web"))
            .unwrap_or(0);
        if processes.is_empty() {
            return Err(CfError::NoProcess(app_guid.to_string()));
        }
        Ok(processes.swap_remove(index).guid)
    }

    async fn process_instance_states(&self, process_guid: &str) -> CfResult<InstanceStates> {
        let url = self.endpoint(&format!("/v3/processes/{process_guid}/stats"));
        let list: ResourceList<ProcessStat> = self.get(&url).await?;
        Ok(InstanceStates(
            list.resources
                .into_iter()
                .map(|s| s.state.unwrap_or_else(|| "UNKNOWN".to_string()))
                .collect(),
        ))
    }

    async fn restart_app(&self, app_guid: &str) -> CfResult<()> {
        let url = self.endpoint(&format!("/v3/apps/{app_guid}/actions/restart"));
        self.post_json(&url, None).await.map(|_| ())
    }

    async fn start_app(&self, app_guid: &str) -> CfResult<()> {
        let url = self.endpoint(&format!("/v3/apps/{app_guid}/actions/start"));
        self.post_json(&url, None).await.map(|_| ())
    }

    async fn app_metadata(&self, app_guid: &str) -> AppMetadata {
        match self.try_app_metadata(app_guid).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(%app_guid, error = %e, "metadata lookup failed");
                AppMetadata::unknown()
            }
        }
    }
}
