//! Per-run token cache.

use std::collections::HashMap;

use keeper_cf::{AuthToken, CfResult, Platform};
use keeper_core::RegionConfig;
use tracing::debug;

/// Region-scoped bearer tokens for a single orchestration or monitoring pass.
///
/// Each pass owns its cache; tokens are never shared across passes.
/// Only successful exchanges are cached.
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: HashMap<String, AuthToken>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token for `region`, fetching it on first use.
    pub async fn get_or_fetch(
        &mut self,
        platform: &dyn Platform,
        region: &RegionConfig,
    ) -> CfResult<AuthToken> {
        if let Some(token) = self.tokens.get(&region.code) {
            debug!(region = %region.code, "reusing cached token");
            return Ok(token.clone());
        }
        let token = platform.authenticate(region).await?;
        self.tokens.insert(region.code.clone(), token.clone());
        Ok(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
