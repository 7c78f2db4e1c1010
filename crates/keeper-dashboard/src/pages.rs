//! Status page handler.
//!
//! Runs a fleet pass, builds view types, and renders an Askama template.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tracing::error;

use crate::DashboardState;
use crate::views::{AppCardView, FleetSummary};

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        error!(error = %e, "template render failed");
        format!("<pre>Template error: {e}</pre>")
    }))
}

#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub summary: FleetSummary,
    pub apps: Vec<AppCardView>,
    pub updated_at: String,
}

pub async fn status(State(state): State<DashboardState>) -> Html<String> {
    let snapshots = state.ctx.fleet_monitor().snapshot("status-page").await;
    let apps: Vec<AppCardView> = snapshots.iter().map(AppCardView::from_snapshot).collect();

    render(StatusTemplate {
        summary: FleetSummary::from_cards(&apps),
        apps,
        updated_at: state.ctx.clock().now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_orchestrator::AppSnapshot;

    fn card(name: &str, healthy: bool, region: &str) -> AppCardView {
        AppCardView::from_snapshot(&AppSnapshot {
            app: name.into(),
            url: format!("https://{name}.cfapps.us10-001.hana.ondemand.com"),
            healthy,
            region: Some(region.into()),
            metadata: Default::default(),
        })
    }

    #[test]
    fn renders_one_card_per_app() {
        let apps = vec![card("alpha", true, "US"), card("beta", false, "AP")];
        let html = render(StatusTemplate {
            summary: FleetSummary::from_cards(&apps),
            apps,
            updated_at: "2025-09-17 04:05".into(),
        })
        .0;

        assert!(html.contains("alpha"));
        assert!(html.contains("beta"));
        assert!(html.contains("United States"));
        assert!(html.contains("Singapore"));
        assert!(html.contains("Offline"));
        assert!(html.contains("2025-09-17 04:05"));
        assert!(!html.contains("Template error"));
    }

    #[test]
    fn empty_fleet_renders_placeholder() {
        let html = render(StatusTemplate {
            summary: FleetSummary::from_cards(&[]),
            apps: Vec::new(),
            updated_at: "now".into(),
        })
        .0;
        assert!(html.contains("No apps configured"));
    }
}
