//! UAA password-grant token exchange.

use std::fmt;

use keeper_core::Credentials;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{CfError, CfResult, excerpt};

/// Public CF CLI client id; its secret is empty.
const CLIENT_ID: &str = "cf";

/// A bearer token scoped to one region.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub region: String,
    pub bearer: String,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("region", &self.region)
            .field("bearer", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchanges operator credentials for a bearer token. Performs no caching.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    http: reqwest::Client,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST `{uaa_url}/oauth/token` with a password grant.
    ///
    /// Any transport failure, non-2xx status or missing `access_token`
    /// is reported as [`CfError::Auth`].
    pub async fn fetch_token(
        &self,
        credentials: &Credentials,
        region: &str,
        uaa_url: &str,
    ) -> CfResult<AuthToken> {
        let endpoint = format!("{}/oauth/token", uaa_url.trim_end_matches('/'));
        let auth_err = |reason: String| CfError::Auth {
            uaa_url: uaa_url.to_string(),
            reason,
        };

        info!(email = %credentials.email, %region, %uaa_url, "requesting uaa token");

        let form = [
            ("grant_type", "password"),
            ("username", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
            ("response_type", "token"),
        ];
        let resp = self
            .http
            .post(&endpoint)
            .basic_auth(CLIENT_ID, Some(""))
            .form(&form)
            .send()
            .await
            .map_err(|e| auth_err(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| auth_err(e.to_string()))?;
        debug!(%region, status = status.as_u16(), body = %excerpt(&body), "uaa response");

        if !status.is_success() {
            warn!(%region, status = status.as_u16(), "uaa rejected token request");
            return Err(auth_err(format!("{} {}", status.as_u16(), excerpt(&body))));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| auth_err(format!("invalid token response: {e}")))?;
        let bearer = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| auth_err("response has no access_token".to_string()))?;

        Ok(AuthToken {
            region: region.to_string(),
            bearer,
        })
    }
}
