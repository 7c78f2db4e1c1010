//! keeper-orchestrator — restart state machine and fleet status.
//!
//! [`RestartOrchestrator`] takes one app from "URL does not answer 200"
//! through region, token, identity, restart/start and readiness waits to
//! a verified outcome. [`FleetMonitor`] is its read-only sibling used by
//! status surfaces. [`KeeperContext`] wires both from [`Settings`].
//!
//! [`Settings`]: keeper_core::Settings

pub mod context;
pub mod error;
pub mod fleet;
pub mod restart;
pub mod tokens;

#[cfg(test)]
pub(crate) mod testing;

pub use context::KeeperContext;
pub use error::{RestartError, RestartResult};
pub use fleet::{AppSnapshot, FleetMonitor};
pub use restart::{
    OrchestrationResult, Outcome, RestartOrchestrator, RestartPhase, RestartTiming, SETTLE_TIME,
};
pub use tokens::TokenCache;
