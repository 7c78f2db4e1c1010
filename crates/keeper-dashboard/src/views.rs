//! View types for the status page.
//!
//! Pre-formatted strings only, so the template stays free of logic.

use keeper_orchestrator::AppSnapshot;

pub struct AppCardView {
    pub name: String,
    pub url: String,
    pub healthy: bool,
    pub status_label: &'static str,
    pub region_name: &'static str,
    pub memory: String,
    pub disk: String,
    pub org: String,
    pub space: String,
}

impl AppCardView {
    pub fn from_snapshot(snap: &AppSnapshot) -> Self {
        Self {
            name: snap.app.clone(),
            url: snap.url.clone(),
            healthy: snap.healthy,
            status_label: if snap.healthy { "Online" } else { "Offline" },
            region_name: region_display_name(snap.region.as_deref()),
            memory: snap.metadata.memory_label(),
            disk: snap.metadata.disk_label(),
            org: snap.metadata.org_label().to_string(),
            space: snap.metadata.space_label().to_string(),
        }
    }

    pub fn status_class(&self) -> &'static str {
        if self.healthy { "up" } else { "down" }
    }
}

pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
}

impl FleetSummary {
    pub fn from_cards(cards: &[AppCardView]) -> Self {
        let online = cards.iter().filter(|c| c.healthy).count();
        Self {
            total: cards.len(),
            online,
            offline: cards.len() - online,
        }
    }
}

/// Human name of a region code.
pub fn region_display_name(code: Option<&str>) -> &'static str {
    match code {
        Some("US") => "United States",
        Some("AP") => "Singapore",
        _ => "Unknown",
    }
}
