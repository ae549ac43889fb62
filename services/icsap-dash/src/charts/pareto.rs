use charming::component::{Axis, Legend, Title};
use charming::datatype::{DataPoint, DataPointItem};
use charming::element::{
    AxisLabel, AxisType, ItemStyle, Label, LabelPosition, LineStyle, LineStyleType, Tooltip,
    Trigger,
};
use charming::series::{Bar, Line};
use charming::Chart;

use super::ChartStyle;
use crate::aggregation::ParetoTable;

/// Ranked bars of ICSAP admissions by category with the cumulative share on
/// a secondary axis and a dashed line at the threshold.
pub fn chart(table: &ParetoTable, style: &ChartStyle) -> Chart {
    let palette = &style.palette;
    let categories: Vec<String> = table.rows.iter().map(|r| r.category.clone()).collect();

    let bars: Vec<DataPoint> = table
        .rows
        .iter()
        .map(|r| {
            let color = if r.vital { &palette.vital } else { &palette.trivial };
            DataPointItem::new(r.admissions as f64)
                .item_style(ItemStyle::new().color(color.as_str()))
                .into()
        })
        .collect();
    let cumulative: Vec<f64> = table.rows.iter().map(|r| r.cumulative_percent).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text(format!("Pareto das ICSAP por {}", table.dimension.label()))
                .left("center"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().top("bottom").left("center"))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name(table.dimension.label())
                .data(categories),
        )
        .y_axis(Axis::new().type_(AxisType::Value).name("Internações"))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name("% acumulado")
                .min(0)
                .max(105)
                .axis_label(AxisLabel::new().formatter("{value}%")),
        )
        .series(
            Bar::new()
                .name("Internações ICSAP")
                .label(Label::new().show(true).position(LabelPosition::Top))
                .data(bars),
        )
        .series(
            Line::new()
                .name("% acumulado")
                .y_axis_index(1)
                .line_style(LineStyle::new().color(palette.cumulative.as_str()))
                .data(cumulative),
        );

    if !table.rows.is_empty() {
        chart = chart.series(
            Line::new()
                .name(format!("{:.0}%", table.threshold))
                .y_axis_index(1)
                .show_symbol(false)
                .line_style(
                    LineStyle::new()
                        .color(palette.threshold.as_str())
                        .type_(LineStyleType::Dashed),
                )
                .data(vec![table.threshold; table.rows.len()]),
        );
    }
    chart
}
