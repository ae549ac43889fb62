use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::Serialize;
use svckit::types::{AdmissionRecord, IcsapFlag};

use crate::stats::{argmax, argmin, linear_fit, mean, percent_change, LinearFit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointClass {
    SeriesMax,
    SeriesMin,
    AboveMean,
    BelowMean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub period: NaiveDate,
    /// `YYYY-MM`
    pub label: String,
    pub icsap: u64,
    pub non_icsap: u64,
    pub total: u64,
    /// ICSAP share of the month's admissions, in `[0, 1]`.
    pub proportion: f64,
    pub change_percent: Option<f64>,
    pub trend: f64,
    pub class: PointClass,
}

/// ICSAP proportion per month over a trailing window ending at the latest
/// month present in the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub points: Vec<MonthlyPoint>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub fit: Option<LinearFit>,
    /// Records dropped for lacking a usable year/month.
    pub skipped: usize,
}

impl MonthlySeries {
    pub fn compute<'a>(
        records: impl IntoIterator<Item = &'a AdmissionRecord>,
        window_months: u32,
    ) -> Self {
        let mut by_month: BTreeMap<NaiveDate, [u64; 2]> = BTreeMap::new();
        let mut skipped = 0;
        for record in records {
            let Some(period) = record.period() else {
                skipped += 1;
                continue;
            };
            let counts = by_month.entry(period).or_default();
            match record.icsap {
                IcsapFlag::Icsap => counts[0] += record.admissions,
                IcsapFlag::NonIcsap => counts[1] += record.admissions,
            }
        }

        let Some(&end) = by_month.keys().next_back() else {
            return Self::empty(skipped);
        };
        let span = window_months.max(1) - 1;
        let start = end
            .checked_sub_months(Months::new(span))
            .unwrap_or(NaiveDate::MIN);

        let mut points: Vec<MonthlyPoint> = by_month
            .range(start..=end)
            .map(|(&period, &[icsap, non_icsap])| {
                let total = icsap + non_icsap;
                let proportion = if total > 0 {
                    icsap as f64 / total as f64
                } else {
                    0.0
                };
                MonthlyPoint {
                    period,
                    label: period.format("%Y-%m").to_string(),
                    icsap,
                    non_icsap,
                    total,
                    proportion,
                    change_percent: None,
                    trend: 0.0,
                    class: PointClass::BelowMean,
                }
            })
            .collect();

        let proportions: Vec<f64> = points.iter().map(|p| p.proportion).collect();
        let fit = linear_fit(&proportions);
        let series_mean = mean(&proportions).unwrap_or(0.0);
        let max_idx = argmax(&proportions);
        let min_idx = argmin(&proportions);

        for i in 0..points.len() {
            if i > 0 {
                points[i].change_percent =
                    percent_change(proportions[i - 1], proportions[i]);
            }
            if let Some(fit) = fit {
                points[i].trend = fit.at(i as f64);
            }
            points[i].class = if Some(i) == max_idx {
                PointClass::SeriesMax
            } else if Some(i) == min_idx {
                PointClass::SeriesMin
            } else if proportions[i] > series_mean {
                PointClass::AboveMean
            } else {
                PointClass::BelowMean
            };
        }

        Self {
            window_start: Some(start),
            window_end: Some(end),
            mean: series_mean,
            max: max_idx.map_or(0.0, |i| proportions[i]),
            min: min_idx.map_or(0.0, |i| proportions[i]),
            fit,
            skipped,
            points,
        }
    }

    fn empty(skipped: usize) -> Self {
        Self {
            points: Vec::new(),
            window_start: None,
            window_end: None,
            mean: 0.0,
            max: 0.0,
            min: 0.0,
            fit: None,
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32, icsap: u64, non_icsap: u64) -> Vec<AdmissionRecord> {
        vec![
            AdmissionRecord::grain(year, month, IcsapFlag::Icsap, icsap),
            AdmissionRecord::grain(year, month, IcsapFlag::NonIcsap, non_icsap),
        ]
    }

    fn thirteen_months() -> Vec<AdmissionRecord> {
        let mut data = Vec::new();
        for m in 1..=12u32 {
            data.extend(month(2023, m, 10 + m as u64, 90 - m as u64));
        }
        data.extend(month(2024, 1, 30, 70));
        data
    }

    #[test]
    fn test_window_keeps_last_twelve_months() {
        let data = thirteen_months();
        let series = MonthlySeries::compute(&data, 12);

        assert_eq!(series.points.len(), 12);
        assert_eq!(series.points[0].label, "2023-02");
        assert_eq!(series.points[11].label, "2024-01");
        assert_eq!(series.window_end, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(series.window_start, NaiveDate::from_ymd_opt(2023, 2, 1));
    }

    #[test]
    fn test_repeated_first_month_a_year_later_drops_the_original() {
        // 2024-01 carries exactly the flag totals of 2023-01
        let mut data = Vec::new();
        for m in 1..=12u32 {
            data.extend(month(2023, m, 40 + m as u64, 60));
        }
        data.extend(month(2024, 1, 41, 60));
        let series = MonthlySeries::compute(&data, 12);

        assert_eq!(series.points.len(), 12);
        assert_eq!(series.points[0].label, "2023-02");
        assert_eq!(series.points[0].icsap, 42);
        let last = &series.points[11];
        assert_eq!(last.label, "2024-01");
        assert_eq!((last.icsap, last.non_icsap), (41, 60));
        assert!(series.points.iter().all(|p| p.label != "2023-01"));
    }

    #[test]
    fn test_proportions_and_trend_line() {
        let data = thirteen_months();
        let series = MonthlySeries::compute(&data, 12);

        assert!(series
            .points
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.proportion)));
        let last = &series.points[11];
        assert_eq!(last.total, 100);
        assert!((last.proportion - 0.3).abs() < 1e-9);

        let fit = series.fit.unwrap();
        assert!(fit.slope > 0.0);
        assert!((series.points[0].trend - fit.intercept).abs() < 1e-12);
    }

    #[test]
    fn test_change_percent_first_row_undefined() {
        let mut data = month(2024, 1, 20, 80);
        data.extend(month(2024, 2, 30, 70));
        data.extend(month(2024, 3, 0, 50));
        data.extend(month(2024, 4, 10, 40));
        let series = MonthlySeries::compute(&data, 12);

        assert_eq!(series.points[0].change_percent, None);
        assert!((series.points[1].change_percent.unwrap() - 50.0).abs() < 1e-9);
        assert!((series.points[2].change_percent.unwrap() + 100.0).abs() < 1e-9);
        // zero base
        assert_eq!(series.points[3].change_percent, None);
    }

    #[test]
    fn test_point_classification() {
        let mut data = month(2024, 1, 10, 90);
        data.extend(month(2024, 2, 50, 50));
        data.extend(month(2024, 3, 20, 80));
        data.extend(month(2024, 4, 40, 60));
        let series = MonthlySeries::compute(&data, 12);

        let classes: Vec<PointClass> = series.points.iter().map(|p| p.class).collect();
        assert_eq!(
            classes,
            vec![
                PointClass::SeriesMin,
                PointClass::SeriesMax,
                PointClass::BelowMean,
                PointClass::AboveMean,
            ]
        );
        assert!((series.mean - 0.3).abs() < 1e-9);
        assert!((series.max - 0.5).abs() < 1e-9);
        assert!((series.min - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series_marks_first_point_as_max() {
        let mut data = month(2024, 1, 1, 1);
        data.extend(month(2024, 2, 1, 1));
        let series = MonthlySeries::compute(&data, 12);
        assert_eq!(series.points[0].class, PointClass::SeriesMax);
        assert_eq!(series.points[1].class, PointClass::BelowMean);
        assert_eq!(series.fit.unwrap().slope, 0.0);
    }

    #[test]
    fn test_missing_flag_and_zero_totals() {
        let data = vec![
            AdmissionRecord::grain(2024, 5, IcsapFlag::NonIcsap, 40),
            AdmissionRecord::grain(2024, 6, IcsapFlag::Icsap, 0),
        ];
        let series = MonthlySeries::compute(&data, 12);
        assert_eq!(series.points[0].icsap, 0);
        assert_eq!(series.points[0].proportion, 0.0);
        assert_eq!(series.points[1].total, 0);
        assert_eq!(series.points[1].proportion, 0.0);
    }

    #[test]
    fn test_records_without_period_are_skipped() {
        let mut undated = AdmissionRecord::grain(2024, 1, IcsapFlag::Icsap, 5);
        undated.year = None;
        let data = vec![undated, AdmissionRecord::grain(2024, 2, IcsapFlag::Icsap, 5)];
        let series = MonthlySeries::compute(&data, 12);
        assert_eq!(series.skipped, 1);
        assert_eq!(series.points.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let series = MonthlySeries::compute(std::iter::empty(), 12);
        assert!(series.is_empty());
        assert_eq!(series.fit, None);
        assert_eq!(series.window_end, None);
    }
}
