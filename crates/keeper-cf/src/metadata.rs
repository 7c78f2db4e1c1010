//! Advisory application metadata shown on status surfaces.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Sentinel rendered for any field that could not be looked up.
pub const UNKNOWN: &str = "N/A";

/// Memory, disk, org and space of an application.
///
/// Each field is independently optional; a failed lookup never hides the
/// fields that did resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppMetadata {
    pub memory_mb: Option<u64>,
    pub disk_mb: Option<u64>,
    pub org: Option<String>,
    pub space: Option<String>,
}

impl AppMetadata {
    /// All fields unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn memory_label(&self) -> String {
        megabytes(self.memory_mb)
    }

    pub fn disk_label(&self) -> String {
        megabytes(self.disk_mb)
    }

    pub fn org_label(&self) -> &str {
        self.org.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn space_label(&self) -> &str {
        self.space.as_deref().unwrap_or(UNKNOWN)
    }
}

fn megabytes(value: Option<u64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |mb| format!("{mb} MB"))
}

impl Serialize for AppMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AppMetadata", 4)?;
        s.serialize_field("org", self.org_label())?;
        s.serialize_field("space", self.space_label())?;
        s.serialize_field("memory", &self.memory_label())?;
        s.serialize_field("disk", &self.disk_label())?;
        s.end()
    }
}
