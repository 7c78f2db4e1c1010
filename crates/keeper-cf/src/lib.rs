//! keeper-cf — Cloud Foundry control-plane access for cfkeeper.
//!
//! # Layers
//!
//! ```text
//! Platform (trait)            CfPlatform
//!   ├── authenticate()   ──►  TokenProvider  ── POST {uaa}/oauth/token
//!   └── control_plane()  ──►  ControlPlaneClient
//!                               ├── get_json / post_json   (bearer, non-2xx → ControlPlane error)
//!                               └── typed ops: app lookup, state, processes, stats,
//!                                   restart/start, metadata chain
//! ```
//!
//! The orchestrator only sees the [`Platform`] and [`ControlPlane`] traits,
//! so it can be exercised against in-memory fakes.

pub mod auth;
pub mod client;
pub mod error;
pub mod metadata;
pub mod model;
pub mod platform;

pub use auth::{AuthToken, TokenProvider};
pub use client::ControlPlaneClient;
pub use error::{CfError, CfResult};
pub use metadata::AppMetadata;
pub use model::InstanceStates;
pub use platform::{CfPlatform, ControlPlane, Platform};

use std::time::Duration;

/// Timeout applied to every UAA and control-plane request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by token exchange and control-plane calls.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("cfkeeper/0.1")
        .build()
}
