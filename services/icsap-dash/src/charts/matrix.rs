use charming::component::{Axis, Grid, Title, VisualMap};
use charming::element::{AxisType, Label, Orient, Tooltip, Trigger};
use charming::datatype::DataPoint;
use charming::series::Heatmap;
use charming::Chart;

use super::ChartStyle;
use crate::aggregation::YearMonthMatrix;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}

/// Heatmap of ICSAP admissions (thousands). Column totals go under each
/// month label and row totals next to each year.
pub fn chart(matrix: &YearMonthMatrix, _style: &ChartStyle) -> Chart {
    let months: Vec<String> = matrix
        .months
        .iter()
        .zip(&matrix.month_totals)
        .map(|(&m, total)| format!("{}\n({:.1})", month_name(m), total))
        .collect();
    let years: Vec<String> = matrix
        .years
        .iter()
        .zip(&matrix.year_totals)
        .map(|(y, total)| format!("{} ({:.1})", y, total))
        .collect();

    let mut cells: Vec<Vec<DataPoint>> = Vec::new();
    for (y, row) in matrix.cells.iter().enumerate() {
        for (m, &value) in row.iter().enumerate() {
            cells.push(vec![(m as f64).into(), (y as f64).into(), value.into()]);
        }
    }
    let max = matrix
        .cells
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);

    Chart::new()
        .title(
            Title::new()
                .text("Internações ICSAP por ano e mês (mil)")
                .subtext(format!("Total: {:.1} mil", matrix.grand_total))
                .left("center"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .grid(Grid::new().top("15%").bottom("20%").contain_label(true))
        .x_axis(Axis::new().type_(AxisType::Category).name("Mês").data(months))
        .y_axis(Axis::new().type_(AxisType::Category).name("Ano").data(years))
        .visual_map(
            VisualMap::new()
                .min(0.0)
                .max(max)
                .calculable(true)
                .orient(Orient::Horizontal)
                .left("center")
                .bottom("0%"),
        )
        .series(
            Heatmap::new()
                .name("Internações (mil)")
                .label(Label::new().show(true))
                .data(cells),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Figure;
    use svckit::types::{AdmissionRecord, IcsapFlag};

    fn figure(matrix: &YearMonthMatrix) -> Figure {
        Figure::from_chart(&chart(matrix, &ChartStyle::default())).unwrap()
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dez");
        assert_eq!(month_name(0), "?");
        assert_eq!(month_name(13), "?");
    }

    #[test]
    fn test_heatmap_with_marginals() {
        let data = vec![
            AdmissionRecord::grain(2023, 1, IcsapFlag::Icsap, 2000),
            AdmissionRecord::grain(2023, 2, IcsapFlag::Icsap, 1000),
            AdmissionRecord::grain(2024, 2, IcsapFlag::Icsap, 500),
        ];
        let figure = figure(&YearMonthMatrix::compute(&data));

        let heatmap = &figure.series()[0];
        assert_eq!(heatmap["type"], "heatmap");
        // [month index, year index, thousands]
        let cells: Vec<Vec<f64>> = heatmap["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect())
            .collect();
        assert_eq!(
            cells,
            vec![
                vec![0.0, 0.0, 2.0],
                vec![1.0, 0.0, 1.0],
                vec![0.0, 1.0, 0.0],
                vec![1.0, 1.0, 0.5],
            ]
        );

        let x = figure.component("xAxis", 0).unwrap();
        assert_eq!(x["data"], serde_json::json!(["Jan\n(2.0)", "Fev\n(1.5)"]));
        let y = figure.component("yAxis", 0).unwrap();
        assert_eq!(y["data"], serde_json::json!(["2023 (3.0)", "2024 (0.5)"]));
        assert_eq!(figure.component("visualMap", 0).unwrap()["max"].as_f64(), Some(2.0));
        assert_eq!(figure.component("title", 0).unwrap()["subtext"], "Total: 3.5 mil");
    }

    #[test]
    fn test_empty_matrix() {
        let figure = figure(&YearMonthMatrix::compute(std::iter::empty()));
        assert!(figure.is_empty());
        assert_eq!(figure.component("title", 0).unwrap()["subtext"], "Total: 0.0 mil");
    }
}
