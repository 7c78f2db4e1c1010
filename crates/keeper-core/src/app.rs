//! Monitored applications.

use serde::Serialize;
use tracing::warn;
use url::Url;

/// An application kept alive by cfkeeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Public URL probed for reachability.
    pub url: String,
    /// Cloud Foundry app name, derived from the first host label.
    pub name: String,
}

impl AppConfig {
    /// Build an entry from its public URL, or `None` if no name can be derived.
    pub fn from_url(url: &str) -> Option<Self> {
        derive_app_name(url).map(|name| Self {
            url: url.to_string(),
            name,
        })
    }
}

/// Derive an app name from the host label preceding the first dot.
///
/// `https://my-app.cfapps.ap21.hana.ondemand.com` → `my-app`.
pub fn derive_app_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let label = host.split('.').next()?;
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// The fixed set of monitored applications, in configured order.
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    apps: Vec<AppConfig>,
}

impl AppRegistry {
    /// Build the registry, dropping URLs whose name cannot be derived.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let apps = urls
            .into_iter()
            .filter_map(|url| {
                let url = url.as_ref();
                let app = AppConfig::from_url(url);
                if app.is_none() {
                    warn!(%url, "cannot derive app name from url, entry ignored");
                }
                app
            })
            .collect();
        Self { apps }
    }

    /// Find the entry whose public URL equals `url` exactly.
    pub fn find_by_url(&self, url: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|app| app.url == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppConfig> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
