//! HTTP handlers.
//!
//! JSON endpoints answer with the [`ApiResponse`] envelope.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use keeper_orchestrator::AppSnapshot;

use crate::ApiState;

/// Reason recorded for webhook-triggered runs.
pub const WEBHOOK_REASON: &str = "webhook-trigger";

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

// ── Restart webhook ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RestartQuery {
    #[serde(rename = "appUrl")]
    pub app_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct Accepted {
    app: String,
    url: String,
    message: &'static str,
}

/// GET|POST /webhook/restart?appUrl=...
///
/// Acknowledges immediately; the orchestration runs detached.
pub async fn trigger_restart(
    State(state): State<ApiState>,
    Query(query): Query<RestartQuery>,
) -> impl IntoResponse {
    let Some(app_url) = query.app_url.filter(|u| !u.is_empty()) else {
        return error_response("missing appUrl query parameter", StatusCode::BAD_REQUEST)
            .into_response();
    };

    let Some(app) = state.ctx.find_app(&app_url).cloned() else {
        warn!(url = %app_url, "restart requested for unknown app");
        return error_response(
            &format!("no configured app with url {app_url}"),
            StatusCode::NOT_FOUND,
        )
        .into_response();
    };

    info!(app = %app.name, url = %app.url, "restart accepted");
    let body = Accepted {
        app: app.name.clone(),
        url: app.url.clone(),
        message: "restart triggered",
    };
    state.ctx.spawn_restart(app, WEBHOOK_REASON);

    (StatusCode::ACCEPTED, ApiResponse::ok(body)).into_response()
}

// ── Status ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StatusReport {
    apps: Vec<AppSnapshot>,
    timestamp: String,
}

/// GET /status
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    let apps = state.ctx.fleet_monitor().snapshot("api-status-check").await;
    ApiResponse::ok(StatusReport {
        apps,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// ── Misc ───────────────────────────────────────────────────────

/// ANY /start
pub async fn start_hint() -> impl IntoResponse {
    error_response(
        "use /webhook/restart?appUrl=... to restart a single app",
        StatusCode::BAD_REQUEST,
    )
}

pub async fn fallback() -> &'static str {
    "cfkeeper running"
}
