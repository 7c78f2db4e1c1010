//! Long-lived wiring shared by the HTTP surface and the CLI.

use std::sync::Arc;

use keeper_cf::{CfError, CfPlatform, Platform};
use keeper_core::{AppConfig, AppRegistry, RegionTable, Settings};
use keeper_health::{HealthProbe, HttpProbe};
use keeper_notify::{MessageClock, Notifier};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::fleet::FleetMonitor;
use crate::restart::{RestartOrchestrator, RestartTiming};

/// Everything needed to run orchestrations and status passes.
///
/// Cheap to clone; all collaborators sit behind `Arc`.
#[derive(Clone)]
pub struct KeeperContext {
    apps: Arc<AppRegistry>,
    regions: Arc<RegionTable>,
    probe: Arc<dyn HealthProbe>,
    platform: Arc<dyn Platform>,
    notifier: Arc<dyn Notifier>,
    clock: MessageClock,
    timing: RestartTiming,
}

impl KeeperContext {
    pub fn new(
        apps: AppRegistry,
        regions: RegionTable,
        probe: Arc<dyn HealthProbe>,
        platform: Arc<dyn Platform>,
        notifier: Arc<dyn Notifier>,
        clock: MessageClock,
    ) -> Self {
        Self {
            apps: Arc::new(apps),
            regions: Arc::new(regions),
            probe,
            platform,
            notifier,
            clock,
            timing: RestartTiming::default(),
        }
    }

    /// Wire the production collaborators from validated settings.
    pub fn from_settings(settings: Settings) -> Result<Self, CfError> {
        let http = keeper_cf::http_client()?;
        let probe = Arc::new(HttpProbe::new()?);
        let platform = Arc::new(CfPlatform::with_client(http.clone(), settings.credentials));
        let notifier = keeper_notify::from_config(http, settings.telegram.as_ref());

        info!(
            apps = settings.apps.len(),
            regions = settings.regions.len(),
            "keeper context ready"
        );

        Ok(Self::new(
            settings.apps,
            settings.regions,
            probe,
            platform,
            notifier,
            MessageClock::new(settings.utc_offset_hours),
        ))
    }

    pub fn with_timing(mut self, timing: RestartTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn apps(&self) -> &AppRegistry {
        &self.apps
    }

    pub fn find_app(&self, url: &str) -> Option<&AppConfig> {
        self.apps.find_by_url(url)
    }

    pub fn clock(&self) -> MessageClock {
        self.clock
    }

    pub fn orchestrator(&self) -> RestartOrchestrator {
        RestartOrchestrator::new(
            self.regions.clone(),
            self.probe.clone(),
            self.platform.clone(),
            self.notifier.clone(),
            self.clock,
        )
        .with_timing(self.timing)
    }

    pub fn fleet_monitor(&self) -> FleetMonitor {
        FleetMonitor::new(
            self.apps.clone(),
            self.regions.clone(),
            self.probe.clone(),
            self.platform.clone(),
        )
    }

    /// Run an orchestration in the background.
    ///
    /// The outcome only reaches the operator through logs and notifications.
    pub fn spawn_restart(&self, app: AppConfig, reason: &str) -> JoinHandle<()> {
        let orchestrator = self.orchestrator();
        let reason = reason.to_string();
        tokio::spawn(async move {
            match orchestrator.ensure_running(&app, &reason).await {
                Ok(result) => info!(
                    app = %result.app,
                    outcome = ?result.outcome,
                    healthy = result.healthy,
                    "orchestration finished"
                ),
                Err(e) => error!(app = %app.name, kind = e.kind(), error = %e, "orchestration failed"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FakePlatform, RecordingNotifier, ScriptedProbe, new_log};

    const SHOP: &str = "https://shop-sg.cfapps.ap21.hana.ondemand.com";

    #[tokio::test(start_paused = true)]
    async fn spawned_restart_runs_to_completion() {
        let log = new_log();
        let ctx = KeeperContext::new(
            AppRegistry::from_urls([SHOP]),
            RegionTable::builtin(),
            Arc::new(ScriptedProbe::new(log.clone(), &[false, true])),
            Arc::new(FakePlatform::with_log(log.clone())),
            Arc::new(RecordingNotifier::new(log.clone())),
            MessageClock::new(8),
        );

        let app = ctx.find_app(SHOP).cloned().unwrap();
        ctx.spawn_restart(app, "webhook-trigger").await.unwrap();

        let events = log.lock().unwrap().clone();
        assert!(events.contains(&Event::Restart("guid-shop-sg".into())));
        let notices = events.iter().filter(|e| matches!(e, Event::Notify(_))).count();
        assert_eq!(notices, 2);
    }

    #[test]
    fn lookup_is_exact() {
        let log = new_log();
        let ctx = KeeperContext::new(
            AppRegistry::from_urls([SHOP]),
            RegionTable::builtin(),
            Arc::new(ScriptedProbe::new(log.clone(), &[])),
            Arc::new(FakePlatform::with_log(log.clone())),
            Arc::new(RecordingNotifier::new(log)),
            MessageClock::new(0),
        );
        assert!(ctx.find_app(SHOP).is_some());
        assert!(ctx.find_app("https://shop-sg.cfapps.ap21.hana.ondemand.com/").is_none());
        assert_eq!(ctx.apps().len(), 1);
    }
}
