use std::collections::HashMap;

use serde::Serialize;
use svckit::types::{AdmissionRecord, Dimension, IcsapFlag};

use crate::stats::share_percent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoRow {
    pub category: String,
    pub admissions: u64,
    pub cumulative: u64,
    pub cumulative_percent: f64,
    /// Inside the "vital few": cumulative share at or under the threshold.
    pub vital: bool,
}

/// ICSAP admissions ranked by category with running cumulative share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoTable {
    pub dimension: Dimension,
    pub rows: Vec<ParetoRow>,
    pub total: u64,
    pub threshold: f64,
}

impl ParetoTable {
    pub fn compute<'a>(
        records: impl IntoIterator<Item = &'a AdmissionRecord>,
        dimension: Dimension,
        threshold: f64,
        unknown_label: &str,
    ) -> Self {
        let mut sums: HashMap<String, u64> = HashMap::new();
        for record in records {
            if record.icsap != IcsapFlag::Icsap {
                continue;
            }
            let category = record
                .value(dimension)
                .map(|v| v.to_string())
                .unwrap_or_else(|| unknown_label.to_string());
            *sums.entry(category).or_default() += record.admissions;
        }

        let mut ranked: Vec<(String, u64)> = sums.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let total: u64 = ranked.iter().map(|(_, n)| n).sum();
        let mut cumulative = 0;
        let rows = ranked
            .into_iter()
            .map(|(category, admissions)| {
                cumulative += admissions;
                let cumulative_percent = share_percent(cumulative as f64, total as f64);
                ParetoRow {
                    category,
                    admissions,
                    cumulative,
                    cumulative_percent,
                    vital: total > 0 && cumulative as f64 * 100.0 <= threshold * total as f64,
                }
            })
            .collect();

        Self {
            dimension,
            rows,
            total,
            threshold,
        }
    }

    pub fn vital_few(&self) -> impl Iterator<Item = &ParetoRow> {
        self.rows.iter().filter(|r| r.vital)
    }
}
