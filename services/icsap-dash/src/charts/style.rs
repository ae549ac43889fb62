use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregation::PointClass;

/// Presentation knobs shared by every renderer. Sizes and fonts are left to
/// the ECharts theme on the display side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Slice colors keyed by display label.
    pub flags: BTreeMap<String, String>,
    pub fallback: String,
    pub above_mean: String,
    pub below_mean: String,
    pub series_max: String,
    pub series_min: String,
    pub trend: String,
    pub mean_line: String,
    pub rise: String,
    pub fall: String,
    pub vital: String,
    pub trivial: String,
    pub cumulative: String,
    pub threshold: String,
}

impl Default for Palette {
    fn default() -> Self {
        let flags = [
            ("ICSAP", "rgb(30, 60, 114)"),
            ("Não-ICSAP", "rgb(80, 115, 150)"),
        ]
        .into_iter()
        .map(|(label, color)| (label.to_string(), color.to_string()))
        .collect();

        Self {
            flags,
            fallback: "rgb(169, 169, 169)".to_string(),
            above_mean: "rgb(0, 82, 164)".to_string(),
            below_mean: "rgb(30, 144, 255)".to_string(),
            series_max: "rgb(65, 134, 84)".to_string(),
            series_min: "rgb(228, 46, 68)".to_string(),
            trend: "blue".to_string(),
            mean_line: "lightgray".to_string(),
            rise: "green".to_string(),
            fall: "red".to_string(),
            vital: "rgb(30, 60, 114)".to_string(),
            trivial: "rgb(169, 169, 169)".to_string(),
            cumulative: "rgb(228, 46, 68)".to_string(),
            threshold: "gray".to_string(),
        }
    }
}

impl Palette {
    pub fn flag_color(&self, label: &str) -> &str {
        self.flags
            .get(label)
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }

    pub fn class_color(&self, class: PointClass) -> &str {
        match class {
            PointClass::SeriesMax => &self.series_max,
            PointClass::SeriesMin => &self.series_min,
            PointClass::AboveMean => &self.above_mean,
            PointClass::BelowMean => &self.below_mean,
        }
    }

    pub fn change_color(&self, change: f64) -> &str {
        if change > 0.0 {
            &self.rise
        } else {
            &self.fall
        }
    }
}
