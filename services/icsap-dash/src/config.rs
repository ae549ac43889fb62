use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use svckit::config::{ObservabilityConfig, WarehouseConfig};
use svckit::errors::DashError;
use svckit::types::Dimension;

use crate::charts::ChartStyle;
use crate::labels::FlagLabels;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub warehouse: WarehouseConfig,
    pub dashboard: DashboardSettings,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Length of the trailing monthly window, in months.
    pub window_months: u32,
    pub pareto_dimension: Dimension,
    /// Cumulative percentage bounding the "vital few" band.
    pub pareto_threshold: f64,
    /// Category used when the Pareto dimension is null.
    pub unknown_label: String,
    pub labels: FlagLabels,
    pub style: ChartStyle,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            window_months: 12,
            pareto_dimension: Dimension::DiagnosisChapter,
            pareto_threshold: 80.0,
            unknown_label: "Não informado".to_string(),
            labels: FlagLabels::default(),
            style: ChartStyle::default(),
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<(), DashError> {
        if self.window_months == 0 {
            return Err(DashError::Config("window_months must be at least 1".to_string()));
        }
        if !(self.pareto_threshold > 0.0 && self.pareto_threshold <= 100.0) {
            return Err(DashError::Config(format!(
                "pareto_threshold must be in (0, 100], got {}",
                self.pareto_threshold
            )));
        }
        self.labels.validate()
    }
}

/// Loads the YAML file (optional) and overlays `ICSAP_DASH__SECTION__KEY` variables.
pub fn load_config(path: &str) -> Result<DashConfig> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("ICSAP_DASH").separator("__"))
        .build()?;

    let config: DashConfig = config.try_deserialize()?;
    config.dashboard.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::database::WarehouseDriver;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config("/nonexistent/icsap-dash").unwrap();
        assert_eq!(config.dashboard.window_months, 12);
        assert_eq!(config.dashboard.pareto_dimension, Dimension::DiagnosisChapter);
        assert_eq!(config.warehouse.driver, WarehouseDriver::BigQuery);
        assert_eq!(config.warehouse.table, "sih_icsap_pack_demo");
    }

    #[test]
    fn test_yaml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.yaml");
        std::fs::write(
            &path,
            "warehouse:\n  driver: demo\n  demo_months: 6\ndashboard:\n  window_months: 6\n  pareto_dimension: age_bracket\n  labels:\n    icsap: Evitável\n",
        )
        .unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.warehouse.driver, WarehouseDriver::Demo);
        assert_eq!(config.warehouse.demo_months, 6);
        assert_eq!(config.dashboard.window_months, 6);
        assert_eq!(config.dashboard.pareto_dimension, Dimension::AgeBracket);
        assert_eq!(config.dashboard.labels.icsap, "Evitável");
        assert_eq!(config.dashboard.labels.non_icsap, "Não-ICSAP");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let settings = DashboardSettings {
            pareto_threshold: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
