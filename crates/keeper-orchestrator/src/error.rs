//! Error types for a restart orchestration run.

use keeper_cf::CfError;
use keeper_health::PollError;
use thiserror::Error;

/// Result type alias for orchestration runs.
pub type RestartResult<T> = Result<T, RestartError>;

/// Fatal failures of one orchestration run.
#[derive(Debug, Error)]
pub enum RestartError {
    /// No configured region claims the app URL.
    #[error("cannot determine region of app {app} ({url})")]
    Region { app: String, url: String },

    /// Token exchange, lookup or lifecycle action failed.
    #[error(transparent)]
    Platform(#[from] CfError),

    /// A readiness wait ran out of attempts.
    #[error("{stage} not reached in time, final state={final_state}")]
    Timeout {
        stage: &'static str,
        final_state: String,
    },
}

impl RestartError {
    /// Short, stable label for logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            RestartError::Region { .. } => "region",
            RestartError::Platform(CfError::Auth { .. }) => "auth",
            RestartError::Platform(CfError::NotFound(_)) => "not_found",
            RestartError::Platform(CfError::NoProcess(_)) => "no_process",
            RestartError::Platform(CfError::ControlPlane { .. }) => "control_plane",
            RestartError::Platform(_) => "transport",
            RestartError::Timeout { .. } => "timeout",
        }
    }

    pub(crate) fn from_poll(stage: &'static str, err: PollError<CfError>) -> Self {
        match err {
            PollError::Exhausted { last_observed, .. } => RestartError::Timeout {
                stage,
                final_state: last_observed,
            },
            PollError::Probe(e) => RestartError::Platform(e),
        }
    }
}
