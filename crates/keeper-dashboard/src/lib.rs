//! keeper-dashboard — server-rendered status page for cfkeeper.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `/` | One card per configured app: health, region, org, space, memory, disk |

pub mod pages;
pub mod views;

use axum::Router;
use axum::routing::get;
use keeper_orchestrator::KeeperContext;

/// Shared state for dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub ctx: KeeperContext,
}

/// Build the dashboard router.
pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(pages::status))
        .with_state(state)
}
