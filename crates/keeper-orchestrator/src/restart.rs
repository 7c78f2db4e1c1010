//! Restart orchestrator: drives one app from "unreachable" back to healthy.
//!
//! ```text
//! Checking ─► Healthy
//!     └─► NeedsAction ─► ResolvingRegion ─► Authenticating ─► Identifying
//!           ─► Restarting ─► WaitingAppState ─► WaitingProcessState
//!           ─► Verifying ─► Done
//! ```
//!
//! Platform-mutating calls only happen from `Restarting` onward.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use keeper_cf::{ControlPlane, InstanceStates, Platform};
use keeper_core::{AppConfig, RegionTable};
use keeper_health::{BackoffPolicy, HealthProbe, poll_until};
use keeper_notify::{MessageClock, Notifier, message};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{RestartError, RestartResult};
use crate::tokens::TokenCache;

/// Pause between process readiness and the final reachability probe.
pub const SETTLE_TIME: Duration = Duration::from_secs(5);

/// Phase of a single orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPhase {
    Checking,
    Healthy,
    NeedsAction,
    ResolvingRegion,
    Authenticating,
    Identifying,
    Restarting,
    WaitingAppState,
    WaitingProcessState,
    Verifying,
    Done,
}

impl fmt::Display for RestartPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestartPhase::Checking => "checking",
            RestartPhase::Healthy => "healthy",
            RestartPhase::NeedsAction => "needs_action",
            RestartPhase::ResolvingRegion => "resolving_region",
            RestartPhase::Authenticating => "authenticating",
            RestartPhase::Identifying => "identifying",
            RestartPhase::Restarting => "restarting",
            RestartPhase::WaitingAppState => "waiting_app_state",
            RestartPhase::WaitingProcessState => "waiting_process_state",
            RestartPhase::Verifying => "verifying",
            RestartPhase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Terminal outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Healthy,
    RestartedHealthy,
    RestartedButUnhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationResult {
    pub app: String,
    pub url: String,
    pub outcome: Outcome,
    pub healthy: bool,
}

/// Wait budgets for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestartTiming {
    pub app_started: BackoffPolicy,
    pub instances_running: BackoffPolicy,
    pub settle: Duration,
}

impl Default for RestartTiming {
    fn default() -> Self {
        Self {
            app_started: BackoffPolicy::APP_STARTED,
            instances_running: BackoffPolicy::INSTANCES_RUNNING,
            settle: SETTLE_TIME,
        }
    }
}

/// Runs the check-restart-verify sequence for one app at a time.
#[derive(Clone)]
pub struct RestartOrchestrator {
    regions: Arc<RegionTable>,
    probe: Arc<dyn HealthProbe>,
    platform: Arc<dyn Platform>,
    notifier: Arc<dyn Notifier>,
    clock: MessageClock,
    timing: RestartTiming,
}

impl RestartOrchestrator {
    pub fn new(
        regions: Arc<RegionTable>,
        probe: Arc<dyn HealthProbe>,
        platform: Arc<dyn Platform>,
        notifier: Arc<dyn Notifier>,
        clock: MessageClock,
    ) -> Self {
        Self {
            regions,
            probe,
            platform,
            notifier,
            clock,
            timing: RestartTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: RestartTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Make sure `app` answers `200 OK`, restarting it if it does not.
    ///
    /// `reason` names the trigger and appears in the offline notification.
    /// A wait timeout notifies the operator and then returns
    /// [`RestartError::Timeout`]; a final probe that still fails is a
    /// normal [`Outcome::RestartedButUnhealthy`] result.
    pub async fn ensure_running(
        &self,
        app: &AppConfig,
        reason: &str,
    ) -> RestartResult<OrchestrationResult> {
        self.enter(app, RestartPhase::Checking);
        if self.probe.is_healthy(&app.url).await {
            self.enter(app, RestartPhase::Healthy);
            info!(app = %app.name, "app healthy, nothing to do");
            return Ok(self.result(app, Outcome::Healthy, true));
        }

        self.enter(app, RestartPhase::NeedsAction);
        warn!(app = %app.name, url = %app.url, %reason, "app unreachable, starting recovery");
        self.notifier
            .notify(&message::offline(&app.name, &app.url, reason, &self.clock.now()))
            .await;

        self.enter(app, RestartPhase::ResolvingRegion);
        let region = self.regions.resolve(&app.url).ok_or_else(|| {
            error!(app = %app.name, url = %app.url, "no region matches app url");
            RestartError::Region {
                app: app.name.clone(),
                url: app.url.clone(),
            }
        })?;
        debug!(app = %app.name, region = %region.code, "region resolved");

        self.enter(app, RestartPhase::Authenticating);
        let mut tokens = TokenCache::new();
        let token = tokens.get_or_fetch(self.platform.as_ref(), region).await?;
        let cf = self.platform.control_plane(region, &token);

        self.enter(app, RestartPhase::Identifying);
        let app_guid = cf.find_app_guid(&app.name).await?;
        let process_guid = cf.web_process_guid(&app_guid).await?;
        debug!(app = %app.name, %app_guid, %process_guid, "app identified");

        self.enter(app, RestartPhase::Restarting);
        self.restart_or_start(cf.as_ref(), &app.name, &app_guid).await?;

        if let Err(e) = self.wait_until_running(app, cf.as_ref(), &app_guid, &process_guid).await {
            error!(app = %app.name, error = %e, "app did not come back up");
            self.notifier
                .notify(&message::start_timeout(
                    &app.name,
                    &app.url,
                    &self.clock.now(),
                    &e.to_string(),
                ))
                .await;
            return Err(e);
        }

        self.enter(app, RestartPhase::Verifying);
        tokio::time::sleep(self.timing.settle).await;
        let healthy = self.probe.is_healthy(&app.url).await;
        self.enter(app, RestartPhase::Done);

        if healthy {
            info!(app = %app.name, "app restarted and reachable");
            self.notifier
                .notify(&message::restarted(&app.name, &app.url, &self.clock.now()))
                .await;
            Ok(self.result(app, Outcome::RestartedHealthy, true))
        } else {
            warn!(app = %app.name, "app restarted but url still unreachable");
            self.notifier
                .notify(&message::still_unhealthy(&app.name, &app.url, &self.clock.now()))
                .await;
            Ok(self.result(app, Outcome::RestartedButUnhealthy, false))
        }
    }

    /// Any restart failure falls back to a single start attempt.
    async fn restart_or_start(
        &self,
        cf: &dyn ControlPlane,
        app_name: &str,
        app_guid: &str,
    ) -> RestartResult<()> {
        match cf.restart_app(app_guid).await {
            Ok(()) => {
                info!(app = %app_name, %app_guid, "restart issued");
                Ok(())
            }
            Err(e) => {
                warn!(app = %app_name, %app_guid, error = %e, "restart failed, trying start");
                cf.start_app(app_guid).await?;
                info!(app = %app_name, %app_guid, "start issued");
                Ok(())
            }
        }
    }

    async fn wait_until_running(
        &self,
        app: &AppConfig,
        cf: &dyn ControlPlane,
        app_guid: &str,
        process_guid: &str,
    ) -> RestartResult<()> {
        self.enter(app, RestartPhase::WaitingAppState);
        poll_until(
            &self.timing.app_started,
            "app STARTED",
            || cf.app_state(app_guid),
            |state: &String| state == "STARTED",
        )
        .await
        .map_err(|e| RestartError::from_poll("app STARTED", e))?;

        self.enter(app, RestartPhase::WaitingProcessState);
        let states = poll_until(
            &self.timing.instances_running,
            "instance RUNNING",
            || cf.process_instance_states(process_guid),
            |states: &InstanceStates| states.any_running(),
        )
        .await
        .map_err(|e| RestartError::from_poll("instance RUNNING", e))?;
        info!(app = %app.name, %states, "instances running");
        Ok(())
    }

    fn enter(&self, app: &AppConfig, phase: RestartPhase) {
        debug!(app = %app.name, %phase, "restart phase");
    }

    fn result(&self, app: &AppConfig, outcome: Outcome, healthy: bool) -> OrchestrationResult {
        OrchestrationResult {
            app: app.name.clone(),
            url: app.url.clone(),
            outcome,
            healthy,
        }
    }
}
