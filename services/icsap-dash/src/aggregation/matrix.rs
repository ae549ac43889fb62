use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use svckit::types::{AdmissionRecord, IcsapFlag};

/// ICSAP admissions pivoted by year (rows) and month (columns), in thousands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMonthMatrix {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    /// `cells[year_idx][month_idx]`, zero where no admissions were recorded.
    pub cells: Vec<Vec<f64>>,
    pub year_totals: Vec<f64>,
    pub month_totals: Vec<f64>,
    pub grand_total: f64,
}

impl YearMonthMatrix {
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a AdmissionRecord>) -> Self {
        let mut sums: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        let mut months = BTreeSet::new();
        for record in records {
            if record.icsap != IcsapFlag::Icsap {
                continue;
            }
            let (Some(year), Some(month)) = (record.year, record.month) else {
                continue;
            };
            months.insert(month);
            *sums.entry((year, month)).or_default() += record.admissions;
        }

        let years: Vec<i32> = sums
            .keys()
            .map(|&(year, _)| year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let months: Vec<u32> = months.into_iter().collect();

        let cells: Vec<Vec<f64>> = years
            .iter()
            .map(|&year| {
                months
                    .iter()
                    .map(|&month| {
                        sums.get(&(year, month)).copied().unwrap_or(0) as f64 / 1000.0
                    })
                    .collect()
            })
            .collect();

        let year_totals: Vec<f64> = cells.iter().map(|row| row.iter().sum()).collect();
        let month_totals: Vec<f64> = (0..months.len())
            .map(|col| cells.iter().map(|row| row[col]).sum())
            .collect();
        let grand_total = year_totals.iter().sum();

        Self {
            years,
            months,
            cells,
            year_totals,
            month_totals,
            grand_total,
        }
    }

    pub fn cell(&self, year: i32, month: u32) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = self.months.iter().position(|&m| m == month)?;
        Some(self.cells[row][col])
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
