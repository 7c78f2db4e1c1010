//! In-memory fakes of the probe, platform and notifier seams.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keeper_cf::{
    AppMetadata, AuthToken, CfError, CfResult, ControlPlane, InstanceStates, Platform,
};
use keeper_core::RegionConfig;
use keeper_health::HealthProbe;
use keeper_notify::Notifier;

/// Everything the fakes observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Probe(String),
    Notify(String),
    Authenticate(String),
    FindApp(String),
    AppState(String),
    WebProcess(String),
    Stats(String),
    Restart(String),
    Start(String),
    Metadata(String),
}

impl Event {
    pub fn is_platform_call(&self) -> bool {
        !matches!(self, Event::Probe(_) | Event::Notify(_))
    }
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &EventLog, event: Event) {
    log.lock().unwrap().push(event);
}

/// Pop the next scripted value, repeating the last one forever.
fn next_scripted<T: Clone>(queue: &Mutex<VecDeque<T>>, fallback: T) -> T {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().unwrap_or(fallback)
    }
}

/// Probe answering from a script, per URL or globally.
pub struct ScriptedProbe {
    log: EventLog,
    script: Mutex<VecDeque<bool>>,
    per_url: HashMap<String, bool>,
}

impl ScriptedProbe {
    pub fn new(log: EventLog, script: &[bool]) -> Self {
        Self {
            log,
            script: Mutex::new(script.iter().copied().collect()),
            per_url: HashMap::new(),
        }
    }

    pub fn by_url(log: EventLog, answers: &[(&str, bool)]) -> Self {
        Self {
            log,
            script: Mutex::new(VecDeque::new()),
            per_url: answers.iter().map(|(u, h)| (u.to_string(), *h)).collect(),
        }
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn is_healthy(&self, url: &str) -> bool {
        record(&self.log, Event::Probe(url.to_string()));
        match self.per_url.get(url) {
            Some(healthy) => *healthy,
            None => next_scripted(&self.script, false),
        }
    }
}

pub struct RecordingNotifier {
    log: EventLog,
}

impl RecordingNotifier {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        record(&self.log, Event::Notify(message.to_string()));
    }
}

pub struct FakeControlPlane {
    log: EventLog,
    app_states: Mutex<VecDeque<String>>,
    instance_states: Mutex<VecDeque<InstanceStates>>,
    fail_restart: bool,
    fail_start: bool,
    missing_apps: Vec<String>,
    no_processes: bool,
    metadata: AppMetadata,
}

fn rejected(action: &str) -> CfError {
    CfError::ControlPlane {
        method: "POST",
        status: 422,
        url: format!("https://api.test/v3/apps/x/actions/{action}"),
        body_excerpt: "rejected".to_string(),
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn find_app_guid(&self, app_name: &str) -> CfResult<String> {
        record(&self.log, Event::FindApp(app_name.to_string()));
        if self.missing_apps.iter().any(|a| a == app_name) {
            return Err(CfError::NotFound(app_name.to_string()));
        }
        Ok(format!("guid-{app_name}"))
    }

    async fn app_state(&self, app_guid: &str) -> CfResult<String> {
        record(&self.log, Event::AppState(app_guid.to_string()));
        Ok(next_scripted(&self.app_states, "STARTED".to_string()))
    }

    async fn web_process_guid(&self, app_guid: &str) -> CfResult<String> {
        record(&self.log, Event::WebProcess(app_guid.to_string()));
        if self.no_processes {
            return Err(CfError::NoProcess(app_guid.to_string()));
        }
        Ok(format!("proc-{app_guid}"))
    }

    async fn process_instance_states(&self, process_guid: &str) -> CfResult<InstanceStates> {
        record(&self.log, Event::Stats(process_guid.to_string()));
        Ok(next_scripted(
            &self.instance_states,
            InstanceStates(vec!["RUNNING".to_string()]),
        ))
    }

    async fn restart_app(&self, app_guid: &str) -> CfResult<()> {
        record(&self.log, Event::Restart(app_guid.to_string()));
        if self.fail_restart {
            Err(rejected("restart"))
        } else {
            Ok(())
        }
    }

    async fn start_app(&self, app_guid: &str) -> CfResult<()> {
        record(&self.log, Event::Start(app_guid.to_string()));
        if self.fail_start {
            Err(rejected("start"))
        } else {
            Ok(())
        }
    }

    async fn app_metadata(&self, app_guid: &str) -> AppMetadata {
        record(&self.log, Event::Metadata(app_guid.to_string()));
        self.metadata.clone()
    }
}

pub struct FakePlatform {
    log: EventLog,
    control_plane: Arc<FakeControlPlane>,
    fail_auth: bool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::with_log(new_log())
    }

    pub fn with_log(log: EventLog) -> Self {
        Self {
            control_plane: Arc::new(FakeControlPlane {
                log: log.clone(),
                app_states: Mutex::new(VecDeque::new()),
                instance_states: Mutex::new(VecDeque::new()),
                fail_restart: false,
                fail_start: false,
                missing_apps: Vec::new(),
                no_processes: false,
                metadata: AppMetadata {
                    memory_mb: Some(256),
                    disk_mb: Some(512),
                    org: Some("acme".to_string()),
                    space: Some("dev".to_string()),
                },
            }),
            log,
            fail_auth: false,
        }
    }

    fn cp(&mut self) -> &mut FakeControlPlane {
        Arc::get_mut(&mut self.control_plane).expect("configure fake before use")
    }

    pub fn failing_auth(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    pub fn failing_restart(mut self) -> Self {
        self.cp().fail_restart = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.cp().fail_start = true;
        self
    }

    pub fn missing_app(mut self, name: &str) -> Self {
        self.cp().missing_apps.push(name.to_string());
        self
    }

    pub fn without_processes(mut self) -> Self {
        self.cp().no_processes = true;
        self
    }

    pub fn app_states(mut self, states: &[&str]) -> Self {
        self.cp().app_states = Mutex::new(states.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn instance_states(mut self, states: &[&[&str]]) -> Self {
        self.cp().instance_states = Mutex::new(
            states
                .iter()
                .map(|set| InstanceStates(set.iter().map(|s| s.to_string()).collect()))
                .collect(),
        );
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn authenticate(&self, region: &RegionConfig) -> CfResult<AuthToken> {
        record(&self.log, Event::Authenticate(region.code.clone()));
        if self.fail_auth {
            return Err(CfError::Auth {
                uaa_url: region.uaa_url.clone(),
                reason: "401 unauthorized".to_string(),
            });
        }
        Ok(AuthToken {
            region: region.code.clone(),
            bearer: format!("token-{}", region.code),
        })
    }

    fn control_plane(&self, _region: &RegionConfig, _token: &AuthToken) -> Arc<dyn ControlPlane> {
        self.control_plane.clone()
    }
}
