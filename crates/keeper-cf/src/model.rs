//! Subset of the Cloud Foundry v3 resource shapes cfkeeper reads.
//!
//! Every field the control plane may omit is optional so that a sparse
//! response degrades to defaults instead of a decode failure.

use std::fmt;

use serde::Deserialize;

/// A paginated v3 listing (only the first page is consulted).
#[derive(Debug, Deserialize)]
pub struct ResourceList<T> {
    #[serde(default = "Vec::new")]
    pub resources: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppResource {
    #[serde(default)]
    pub guid: String,
    pub name: Option<String>,
    pub state: Option<String>,
    pub relationships: Option<Relationships>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessResource {
    #[serde(default)]
    pub guid: String,
    #[serde(rename = "type")]
    pub process_type: Option<String>,
    pub memory_in_mb: Option<u64>,
    pub disk_in_mb: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessStat {
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpaceResource {
    pub name: Option<String>,
    pub relationships: Option<Relationships>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrganizationResource {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Relationships {
    pub space: Option<ToOne>,
    pub organization: Option<ToOne>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToOne {
    pub data: Option<GuidRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GuidRef {
    pub guid: String,
}

impl Relationships {
    pub fn space_guid(&self) -> Option<&str> {
        guid_of(self.space.as_ref())
    }

    pub fn organization_guid(&self) -> Option<&str> {
        guid_of(self.organization.as_ref())
    }
}

fn guid_of(rel: Option<&ToOne>) -> Option<&str> {
    rel.and_then(|r| r.data.as_ref())
        .map(|d| d.guid.as_str())
        .filter(|g| !g.is_empty())
}

/// Instance-level states of one process, in the order reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceStates(pub Vec<String>);

impl InstanceStates {
    /// At least one instance reports `RUNNING`.
    pub fn any_running(&self) -> bool {
        self.0.iter().any(|s| s == "RUNNING")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InstanceStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("no-instances")
        } else {
            f.write_str(&self.0.join(","))
        }
    }
}
