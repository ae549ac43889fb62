use std::collections::HashMap;

use serde::Serialize;
use svckit::types::{AdmissionRecord, IcsapFlag};

use crate::labels::FlagLabels;
use crate::stats::share_percent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitRow {
    pub flag: IcsapFlag,
    pub label: String,
    pub admissions: u64,
    pub percent: f64,
}

/// Admissions split by the ICSAP flag. Both groups are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinarySplit {
    pub rows: Vec<SplitRow>,
    pub total: u64,
}

impl BinarySplit {
    pub fn compute<'a>(
        records: impl IntoIterator<Item = &'a AdmissionRecord>,
        labels: &FlagLabels,
    ) -> Self {
        let mut totals: HashMap<IcsapFlag, u64> = HashMap::new();
        for record in records {
            *totals.entry(record.icsap).or_default() += record.admissions;
        }
        let total: u64 = totals.values().sum();

        let rows = IcsapFlag::ALL
            .iter()
            .map(|&flag| {
                let admissions = totals.get(&flag).copied().unwrap_or(0);
                SplitRow {
                    flag,
                    label: labels.display(flag).to_string(),
                    admissions,
                    percent: share_percent(admissions as f64, total as f64),
                }
            })
            .collect();

        Self { rows, total }
    }

    pub fn row(&self, flag: IcsapFlag) -> Option<&SplitRow> {
        self.rows.iter().find(|r| r.flag == flag)
    }

    pub fn admissions(&self, flag: IcsapFlag) -> u64 {
        self.row(flag).map_or(0, |r| r.admissions)
    }

    pub fn percent(&self, flag: IcsapFlag) -> f64 {
        self.row(flag).map_or(0.0, |r| r.percent)
    }
}
