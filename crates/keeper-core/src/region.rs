//! Region table and URL → region resolution.
//!
//! Regions are data, not code: each entry carries its API and UAA
//! endpoints plus a domain pattern. Resolution walks the table in
//! configured order and returns the first match.

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// A Cloud Foundry region as written in `keeper.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Short region code, e.g. `US`.
    pub code: String,
    /// Base URL of the v3 control-plane API.
    pub api_url: String,
    /// Base URL of the UAA identity endpoint.
    pub uaa_url: String,
    /// Regex matched against the application's host.
    pub domain_pattern: String,
}

impl RegionConfig {
    /// The built-in SAP BTP Cloud Foundry regions.
    pub fn builtin() -> Vec<RegionConfig> {
        vec![
            RegionConfig {
                code: "US".to_string(),
                api_url: "https://api.cf.us10-001.hana.ondemand.com".to_string(),
                uaa_url: "https://uaa.cf.us10-001.hana.ondemand.com".to_string(),
                domain_pattern: r"\.us10(-001)?\.hana\.ondemand\.com$".to_string(),
            },
            RegionConfig {
                code: "AP".to_string(),
                api_url: "https://api.cf.ap21.hana.ondemand.com".to_string(),
                uaa_url: "https://uaa.cf.ap21.hana.ondemand.com".to_string(),
                domain_pattern: r"\.ap21\.hana\.ondemand\.com$".to_string(),
            },
        ]
    }
}

#[derive(Debug, Clone)]
struct CompiledRegion {
    config: RegionConfig,
    matcher: Regex,
}

/// Ordered, compiled region table.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: Vec<CompiledRegion>,
}

impl RegionTable {
    /// Compile a table from configured regions, preserving order.
    pub fn new(configs: Vec<RegionConfig>) -> ConfigResult<Self> {
        let mut regions = Vec::with_capacity(configs.len());
        for config in configs {
            if regions
                .iter()
                .any(|r: &CompiledRegion| r.config.code == config.code)
            {
                return Err(ConfigError::Invalid(format!(
                    "duplicate region code {}",
                    config.code
                )));
            }
            let matcher =
                Regex::new(&config.domain_pattern).map_err(|source| ConfigError::InvalidPattern {
                    region: config.code.clone(),
                    source,
                })?;
            regions.push(CompiledRegion { config, matcher });
        }
        Ok(Self { regions })
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        // Built-in patterns are static and known to compile.
        Self::new(RegionConfig::builtin()).unwrap_or_else(|_| Self { regions: Vec::new() })
    }

    /// Resolve the region serving `url`.
    ///
    /// Matches against the URL's host when it parses, otherwise against
    /// the raw input. Never fails; `None` means no region claims the URL.
    pub fn resolve(&self, url: &str) -> Option<&RegionConfig> {
        let parsed = Url::parse(url).ok();
        let target = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or(url);

        self.regions
            .iter()
            .find(|r| r.matcher.is_match(target))
            .map(|r| &r.config)
    }

    /// Look up a region by code.
    pub fn get(&self, code: &str) -> Option<&RegionConfig> {
        self.regions
            .iter()
            .find(|r| r.config.code == code)
            .map(|r| &r.config)
    }

    /// Region codes in table order.
    pub fn codes(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.config.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SG_URL: &str = "https://laowang-sap-all-sg.cfapps.ap21.hana.ondemand.com";
    const US_URL: &str = "https://laowang-sap-all-us.cfapps.us10-001.hana.ondemand.com";

    #[test]
    fn builtin_table_resolves_both_regions() {
        let table = RegionTable::builtin();
        assert_eq!(table.codes(), vec!["US", "AP"]);
        assert_eq!(table.resolve(SG_URL).unwrap().code, "AP");
        assert_eq!(table.resolve(US_URL).unwrap().code, "US");
    }

    #[test]
    fn us10_without_suffix_matches() {
        let table = RegionTable::builtin();
        let region = table.resolve("https://demo.cfapps.us10.hana.ondemand.com").unwrap();
        assert_eq!(region.code, "US");
        assert_eq!(region.api_url, "https://api.cf.us10-001.hana.ondemand.com");
    }

    #[test]
    fn path_and_trailing_slash_do_not_break_matching() {
        let table = RegionTable::builtin();
        let url = format!("{SG_URL}/health?probe=1");
        assert_eq!(table.resolve(&url).unwrap().code, "AP");
        assert_eq!(table.resolve(&format!("{US_URL}/")).unwrap().code, "US");
    }

    #[test]
    fn unknown_domain_resolves_to_none() {
        let table = RegionTable::builtin();
        assert!(table.resolve("https://example.com").is_none());
        assert!(table.resolve("https://demo.cfapps.eu10.hana.ondemand.com").is_none());
    }

    #[test]
    fn unparseable_input_is_matched_raw() {
        let table = RegionTable::builtin();
        assert_eq!(table.resolve("demo.cfapps.ap21.hana.ondemand.com").unwrap().code, "AP");
        assert!(table.resolve("not a url").is_none());
    }

    #[test]
    fn resolution_is_deterministic_and_exclusive() {
        let table = RegionTable::builtin();
        for url in [SG_URL, US_URL] {
            let first = table.resolve(url).map(|r| r.code.clone());
            for _ in 0..5 {
                assert_eq!(table.resolve(url).map(|r| r.code.clone()), first);
            }
            let matching = RegionConfig::builtin()
                .into_iter()
                .filter(|r| {
                    let single = RegionTable::new(vec![r.clone()]).unwrap();
                    single.resolve(url).is_some()
                })
                .count();
            assert_eq!(matching, 1, "{url} should match exactly one region");
        }
    }

    #[test]
    fn first_matching_region_wins() {
        let table = RegionTable::new(vec![
            RegionConfig {
                code: "WIDE".to_string(),
                api_url: "https://api.wide".to_string(),
                uaa_url: "https://uaa.wide".to_string(),
                domain_pattern: r"\.ondemand\.com$".to_string(),
            },
            RegionConfig {
                code: "AP".to_string(),
                api_url: "https://api.ap".to_string(),
                uaa_url: "https://uaa.ap".to_string(),
                domain_pattern: r"\.ap21\.hana\.ondemand\.com$".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(table.resolve(SG_URL).unwrap().code, "WIDE");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = RegionTable::new(vec![RegionConfig {
            code: "BAD".to_string(),
            api_url: "https://api".to_string(),
            uaa_url: "https://uaa".to_string(),
            domain_pattern: "(".to_string(),
        }])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref region, .. } if region == "BAD"));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let mut regions = RegionConfig::builtin();
        regions.push(regions[0].clone());
        assert!(matches!(
            RegionTable::new(regions),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn lookup_by_code() {
        let table = RegionTable::builtin();
        assert_eq!(
            table.get("AP").unwrap().uaa_url,
            "https://uaa.cf.ap21.hana.ondemand.com"
        );
        assert!(table.get("EU").is_none());
    }
}
