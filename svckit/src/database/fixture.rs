// svckit/src/database/fixture.rs
//
// JSON fixture connection: a file holding an array of row objects
//

use std::path::PathBuf;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::DashError;
use crate::types::{ColumnValue, RowData};
use super::factory::WarehouseConnection;

pub struct FixtureConnection {
    path: PathBuf,
}

impl FixtureConnection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WarehouseConnection for FixtureConnection {
    async fn query(&self, sql: &str) -> Result<Vec<RowData>, DashError> {
        debug!("Fixture source ignores query text: {}", sql);
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let objects: Vec<Map<String, Value>> = serde_json::from_str(&raw)?;

        let rows: Vec<RowData> = objects
            .iter()
            .map(|object| RowData {
                columns: object
                    .iter()
                    .map(|(name, value)| (name.clone(), ColumnValue::from_json(value)))
                    .collect(),
            })
            .collect();

        info!("Loaded {} rows from fixture {}", rows.len(), self.path.display());
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), DashError> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"ANO_INT": 2024, "MES_INT": 1, "IS_ICSAP": "Sim", "total_aih_distintos_neste_grao": 5}},
               {{"ANO_INT": 2024, "MES_INT": 1, "IS_ICSAP": "Não", "total_aih_distintos_neste_grao": 9, "CNES": null}}]"#
        )
        .unwrap();

        let conn = FixtureConnection::new(file.path());
        conn.health_check().await.unwrap();
        let rows = conn.query("SELECT *").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ANO_INT"), Some(&ColumnValue::BigInt(2024)));
        assert_eq!(rows[1].get("CNES"), Some(&ColumnValue::Null));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let conn = FixtureConnection::new("/nonexistent/icsap-fixture.json");
        assert!(matches!(conn.query("SELECT *").await, Err(DashError::Io(_))));
        assert!(conn.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_file_is_schema_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let conn = FixtureConnection::new(file.path());
        assert!(matches!(conn.query("SELECT *").await, Err(DashError::Schema(_))));
    }
}
