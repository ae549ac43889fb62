//! Chart rendering. Each renderer turns one summary into an ECharts option
//! built with `charming`; a [`Figure`] is that option in JSON form, ready to
//! hand to `echarts.setOption` on the display side.

pub mod matrix;
pub mod monthly;
pub mod pareto;
pub mod split;
pub mod style;

use std::fmt;
use std::str::FromStr;

use charming::Chart;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use svckit::errors::DashError;

use crate::aggregation::Summaries;

pub use style::{ChartStyle, Palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Split,
    Monthly,
    Matrix,
    Pareto,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Split,
        ChartKind::Monthly,
        ChartKind::Matrix,
        ChartKind::Pareto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Split => "split",
            ChartKind::Monthly => "monthly",
            ChartKind::Matrix => "matrix",
            ChartKind::Pareto => "pareto",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chart kind: {0}")]
pub struct UnknownChartKind(pub String);

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "split" | "donut" => Ok(ChartKind::Split),
            "monthly" | "series" => Ok(ChartKind::Monthly),
            "matrix" | "heatmap" => Ok(ChartKind::Matrix),
            "pareto" => Ok(ChartKind::Pareto),
            _ => Err(UnknownChartKind(s.to_string())),
        }
    }
}

/// Builds the chart for one summary.
pub fn chart(summaries: &Summaries, kind: ChartKind, style: &ChartStyle) -> Chart {
    match kind {
        ChartKind::Split => split::chart(&summaries.split, style),
        ChartKind::Monthly => monthly::chart(&summaries.monthly, style),
        ChartKind::Matrix => matrix::chart(&summaries.matrix, style),
        ChartKind::Pareto => pareto::chart(&summaries.pareto, style),
    }
}

pub fn render(
    summaries: &Summaries,
    kind: ChartKind,
    style: &ChartStyle,
) -> Result<Figure, DashError> {
    Figure::from_chart(&chart(summaries, kind, style))
}

/// Formats an integer with `,` thousands separators.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A rendered ECharts option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Figure(Value);

impl Figure {
    pub fn from_chart(chart: &Chart) -> Result<Self, DashError> {
        serde_json::to_value(chart)
            .map(Figure)
            .map_err(|e| DashError::Render(e.to_string()))
    }

    pub fn option(&self) -> &Value {
        &self.0
    }

    pub fn series(&self) -> &[Value] {
        self.0
            .get("series")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entry `index` of a top-level component (`xAxis`, `yAxis`, `title`, ...),
    /// whether the option holds it as a list or as a single object.
    pub fn component(&self, key: &str, index: usize) -> Option<&Value> {
        match self.0.get(key)? {
            Value::Array(items) => items.get(index),
            single if index == 0 => Some(single),
            _ => None,
        }
    }

    /// True when no series carries any data point.
    pub fn is_empty(&self) -> bool {
        self.series().iter().all(|s| {
            s.get("data")
                .and_then(Value::as_array)
                .map_or(true, |data| data.is_empty())
        })
    }
}
