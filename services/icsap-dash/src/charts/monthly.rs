use charming::component::{Axis, Legend, Title};
use charming::datatype::{DataPoint, DataPointItem};
use charming::element::{
    AxisType, ItemStyle, Label, LabelPosition, LineStyle, LineStyleType, Tooltip, Trigger,
};
use charming::series::{Bar, Line, Scatter};
use charming::Chart;

use super::ChartStyle;
use crate::aggregation::{MonthlyPoint, MonthlySeries};

const TITLE: &str = "Proporção de ICSAP por Competência";

/// Category label of a point, with its period-over-period change on a second
/// line when there is one.
fn category(point: &MonthlyPoint) -> String {
    match point.change_percent {
        Some(change) => {
            let arrow = if change > 0.0 { '▲' } else { '▼' };
            format!("{}\n{} {:.2}%", point.label, arrow, change.abs())
        }
        None => point.label.clone(),
    }
}

/// Bars of the monthly ICSAP proportion colored by point class, with trend,
/// period-over-period markers and the series mean.
pub fn chart(series: &MonthlySeries, style: &ChartStyle) -> Chart {
    let palette = &style.palette;

    let bars: Vec<DataPoint> = series
        .points
        .iter()
        .map(|p| {
            DataPointItem::new(p.proportion)
                .item_style(ItemStyle::new().color(palette.class_color(p.class)))
                .into()
        })
        .collect();

    let mut chart = Chart::new()
        .title(Title::new().text(TITLE).left("center"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().top("bottom").left("center"))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name("Competência")
                .data(series.points.iter().map(category).collect::<Vec<String>>()),
        )
        .y_axis(Axis::new().type_(AxisType::Value).name("Proporção ICSAP"))
        .series(
            Bar::new()
                .name("Proporção ICSAP")
                .label(Label::new().show(true).position(LabelPosition::Top))
                .data(bars),
        )
        .series(
            Line::new()
                .name("Tendência")
                .show_symbol(false)
                .line_style(
                    LineStyle::new()
                        .color(palette.trend.as_str())
                        .type_(LineStyleType::Dashed),
                )
                .data(series.points.iter().map(|p| p.trend).collect::<Vec<f64>>()),
        );

    if series.is_empty() {
        return chart;
    }

    chart = chart.series(
        Line::new()
            .name(format!("Média: {:.2}", series.mean))
            .show_symbol(false)
            .line_style(
                LineStyle::new()
                    .color(palette.mean_line.as_str())
                    .type_(LineStyleType::Dashed),
            )
            .data(vec![series.mean; series.points.len()]),
    );

    // markers sit on the bar they compare against its predecessor
    let (mut rises, mut falls) = (Vec::new(), Vec::new());
    for (i, point) in series.points.iter().enumerate() {
        match point.change_percent {
            Some(change) if change > 0.0 => rises.push(vec![i as f64, point.proportion]),
            Some(_) => falls.push(vec![i as f64, point.proportion]),
            None => {}
        }
    }
    for (name, sign, data) in [("Alta", 1.0, rises), ("Queda", -1.0, falls)] {
        if data.is_empty() {
            continue;
        }
        chart = chart.series(
            Scatter::new()
                .name(name)
                .item_style(ItemStyle::new().color(palette.change_color(sign)))
                .data(data),
        );
    }
    chart
}
