//! Aggregation pipelines. Each one is a pure function of the (filtered)
//! records and is total on empty input.

pub mod matrix;
pub mod monthly;
pub mod pareto;
pub mod split;

use serde::Serialize;
use svckit::types::AdmissionRecord;

use crate::config::DashboardSettings;

pub use matrix::YearMonthMatrix;
pub use monthly::{MonthlyPoint, MonthlySeries, PointClass};
pub use pareto::{ParetoRow, ParetoTable};
pub use split::{BinarySplit, SplitRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summaries {
    pub split: BinarySplit,
    pub monthly: MonthlySeries,
    pub matrix: YearMonthMatrix,
    pub pareto: ParetoTable,
}

impl Summaries {
    pub fn compute(records: &[&AdmissionRecord], settings: &DashboardSettings) -> Self {
        Self {
            split: BinarySplit::compute(records.iter().copied(), &settings.labels),
            monthly: MonthlySeries::compute(records.iter().copied(), settings.window_months),
            matrix: YearMonthMatrix::compute(records.iter().copied()),
            pareto: ParetoTable::compute(
                records.iter().copied(),
                settings.pareto_dimension,
                settings.pareto_threshold,
                &settings.unknown_label,
            ),
        }
    }
}
