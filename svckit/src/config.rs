use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::database::WarehouseDriver;

const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub driver: WarehouseDriver,
    pub endpoint: String,
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    pub location: Option<String>,
    /// Bearer token handed over by whatever materialized the credential.
    pub access_token: Option<String>,
    /// Environment variable consulted when `access_token` is unset.
    pub token_env: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub fixture_path: Option<String>,
    pub demo_months: u32,
    pub demo_seed: u64,
}

impl WarehouseConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Resolves the bearer token, preferring the inline value over the environment.
    pub fn resolve_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            driver: WarehouseDriver::BigQuery,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: "escolap2p".to_string(),
            dataset: "cliente_packbrasil".to_string(),
            table: "sih_icsap_pack_demo".to_string(),
            location: None,
            access_token: None,
            token_env: "GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
            request_timeout_secs: 60,
            page_size: 10_000,
            fixture_path: None,
            demo_months: 24,
            demo_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "icsap_dash=info,svckit=info,tower_http=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_token_wins() {
        let config = WarehouseConfig {
            access_token: Some("inline".to_string()),
            token_env: "ICSAP_TEST_TOKEN_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_token().as_deref(), Some("inline"));
    }

    #[test]
    fn test_blank_token_is_missing() {
        let config = WarehouseConfig {
            access_token: Some("   ".to_string()),
            token_env: "ICSAP_TEST_TOKEN_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_token().is_none());
    }

    #[test]
    fn test_timeout_never_zero() {
        let config = WarehouseConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
