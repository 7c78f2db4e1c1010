//! keeper-api — HTTP surface of cfkeeper.
//!
//! Mounts the status page at `/`.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET, POST | `/webhook/restart?appUrl=` | Start a detached restart, answer 202 |
//! | GET | `/status` | Fleet snapshot as JSON |
//! | GET | `/` | Status page |
//! | any | `/start` | 400 with a usage hint |
//! | any | everything else | Plain-text liveness message |

pub mod handlers;

use axum::Router;
use axum::routing::{any, get};
use keeper_orchestrator::KeeperContext;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub ctx: KeeperContext,
}

/// Build the complete router (webhook + status + page).
pub fn build_router(ctx: KeeperContext) -> Router {
    let api_state = ApiState { ctx: ctx.clone() };
    let dashboard_state = keeper_dashboard::DashboardState { ctx };

    Router::new()
        .route(
            "/webhook/restart",
            get(handlers::trigger_restart).post(handlers::trigger_restart),
        )
        .route("/status", get(handlers::status))
        .route("/start", any(handlers::start_hint))
        .with_state(api_state)
        .merge(keeper_dashboard::dashboard_router(dashboard_state))
        .fallback(handlers::fallback)
}
