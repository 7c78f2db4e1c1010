//! keeper-health — reachability probes and bounded backoff polling.
//!
//! Two primitives used by the restart orchestrator:
//!
//! - [`HealthProbe`]: a binary reachability signal. Only an exact
//!   `200 OK` counts as healthy; every other status, transport error or
//!   timeout is unhealthy. The probe never fails to its caller.
//! - [`poll_until`]: sleep, observe, grow the delay by a factor up to a
//!   cap, and give up after a fixed number of observations.
//!
//! ```text
//! delay:   min(d, c) → min(d·f, c) → min(d·f², c) → …   (max_attempts values)
//! attempt: sleep(delay) ─► observe() ─► satisfied? ─► done
//!                                        └─ no ─► next delay
//! ```

pub mod backoff;
pub mod probe;

pub use backoff::{BackoffPolicy, Delays, PollError, poll_until};
pub use probe::{HealthProbe, HttpProbe, PROBE_TIMEOUT, ProbeResult};
