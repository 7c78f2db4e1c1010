//! Read-only status pass over every configured app.

use std::sync::Arc;

use keeper_cf::{AppMetadata, CfResult, Platform};
use keeper_core::{AppConfig, AppRegistry, RegionConfig, RegionTable};
use keeper_health::HealthProbe;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::tokens::TokenCache;

/// Point-in-time status of one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSnapshot {
    pub app: String,
    pub url: String,
    pub healthy: bool,
    /// Region code, `None` when no region claims the URL.
    pub region: Option<String>,
    #[serde(flatten)]
    pub metadata: AppMetadata,
}

/// Builds [`AppSnapshot`]s for the whole fleet.
///
/// Apps are visited sequentially in configured order. A failure after the
/// health probe only downgrades that app's metadata to sentinels.
#[derive(Clone)]
pub struct FleetMonitor {
    apps: Arc<AppRegistry>,
    regions: Arc<RegionTable>,
    probe: Arc<dyn HealthProbe>,
    platform: Arc<dyn Platform>,
}

impl FleetMonitor {
    pub fn new(
        apps: Arc<AppRegistry>,
        regions: Arc<RegionTable>,
        probe: Arc<dyn HealthProbe>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            apps,
            regions,
            probe,
            platform,
        }
    }

    /// `reason` names the caller in logs.
    pub async fn snapshot(&self, reason: &str) -> Vec<AppSnapshot> {
        info!(%reason, apps = self.apps.len(), "fleet status pass");
        let mut tokens = TokenCache::new();
        let mut snapshots = Vec::with_capacity(self.apps.len());

        for app in self.apps.iter() {
            let healthy = self.probe.is_healthy(&app.url).await;
            let region = self.regions.resolve(&app.url);

            let metadata = match region {
                Some(region) => match self.metadata(&mut tokens, region, app).await {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!(app = %app.name, error = %e, "metadata unavailable");
                        AppMetadata::unknown()
                    }
                },
                None => {
                    warn!(app = %app.name, url = %app.url, "no region matches app url");
                    AppMetadata::unknown()
                }
            };

            debug!(app = %app.name, healthy, "snapshot taken");
            snapshots.push(AppSnapshot {
                app: app.name.clone(),
                url: app.url.clone(),
                healthy,
                region: region.map(|r| r.code.clone()),
                metadata,
            });
        }

        snapshots
    }

    async fn metadata(
        &self,
        tokens: &mut TokenCache,
        region: &RegionConfig,
        app: &AppConfig,
    ) -> CfResult<AppMetadata> {
        let token = tokens.get_or_fetch(self.platform.as_ref(), region).await?;
        let cf = self.platform.control_plane(region, &token);
        let guid = cf.find_app_guid(&app.name).await?;
        Ok(cf.app_metadata(&guid).await)
    }
}
