// svckit/src/database/factory.rs
//
// Runtime warehouse driver selection
// Supports: BigQuery (REST), JSON fixture files, seeded demo data
//

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WarehouseConfig;
use crate::errors::DashError;
use crate::types::RowData;
use super::bigquery::BigQueryConnection;
use super::demo::DemoConnection;
use super::fixture::FixtureConnection;

/// Supported warehouse drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseDriver {
    #[default]
    BigQuery,
    Fixture,
    Demo,
}

impl From<&str> for WarehouseDriver {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fixture" | "file" | "json" => WarehouseDriver::Fixture,
            "demo" | "mock" => WarehouseDriver::Demo,
            "bigquery" | "bq" => WarehouseDriver::BigQuery,
            _ => WarehouseDriver::BigQuery, // Default to BigQuery
        }
    }
}

impl From<String> for WarehouseDriver {
    fn from(s: String) -> Self {
        WarehouseDriver::from(s.as_str())
    }
}

/// Read-only connection to the analytical warehouse
#[async_trait]
pub trait WarehouseConnection: Send + Sync {
    /// Run a query and materialize every result row.
    async fn query(&self, sql: &str) -> Result<Vec<RowData>, DashError>;
    async fn health_check(&self) -> Result<(), DashError>;
    fn driver_name(&self) -> &str;
}

/// Warehouse connection factory
pub struct DatabaseFactory;

impl DatabaseFactory {
    /// Create a connection based on driver type
    pub fn create(
        driver: WarehouseDriver,
        config: &WarehouseConfig,
    ) -> Result<Arc<dyn WarehouseConnection>, DashError> {
        info!("Creating warehouse connection with driver: {:?}", driver);

        match driver {
            WarehouseDriver::BigQuery => Ok(Arc::new(BigQueryConnection::new(config)?)),
            WarehouseDriver::Fixture => {
                let path = config.fixture_path.as_deref().ok_or_else(|| {
                    DashError::Config("fixture driver requires warehouse.fixture_path".to_string())
                })?;
                Ok(Arc::new(FixtureConnection::new(path)))
            }
            WarehouseDriver::Demo => Ok(Arc::new(DemoConnection::new(
                config.demo_months,
                config.demo_seed,
            ))),
        }
    }

    /// Create from config (reads driver field from config)
    pub fn create_from_config(
        config: &WarehouseConfig,
    ) -> Result<Arc<dyn WarehouseConnection>, DashError> {
        Self::create(config.driver, config)
    }

    /// Create from string driver name
    pub fn create_from_str(
        driver_name: &str,
        config: &WarehouseConfig,
    ) -> Result<Arc<dyn WarehouseConnection>, DashError> {
        Self::create(WarehouseDriver::from(driver_name), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_string() {
        assert_eq!(WarehouseDriver::from("fixture"), WarehouseDriver::Fixture);
        assert_eq!(WarehouseDriver::from("JSON"), WarehouseDriver::Fixture);
        assert_eq!(WarehouseDriver::from("demo"), WarehouseDriver::Demo);
        assert_eq!(WarehouseDriver::from("BigQuery"), WarehouseDriver::BigQuery);
        assert_eq!(WarehouseDriver::from("unknown"), WarehouseDriver::BigQuery); // Default
    }

    #[test]
    fn test_driver_from_owned_string() {
        assert_eq!(WarehouseDriver::from("mock".to_string()), WarehouseDriver::Demo);
        assert_eq!(WarehouseDriver::from("bq".to_string()), WarehouseDriver::BigQuery);
    }

    #[test]
    fn test_fixture_driver_requires_path() {
        let config = WarehouseConfig::default();
        assert!(matches!(
            DatabaseFactory::create(WarehouseDriver::Fixture, &config),
            Err(DashError::Config(_))
        ));
    }

    #[test]
    fn test_create_demo_from_str() {
        let config = WarehouseConfig::default();
        let conn = DatabaseFactory::create_from_str("demo", &config).unwrap();
        assert_eq!(conn.driver_name(), "demo");
    }
}
