use charming::component::{Legend, Title};
use charming::datatype::{DataPoint, DataPointItem};
use charming::element::{ItemStyle, Label, Tooltip, Trigger};
use charming::series::Pie;
use charming::Chart;

use super::{format_thousands, ChartStyle};
use crate::aggregation::BinarySplit;

const TITLE: &str = "Qual foi o percentual de ICSAP em todo o período?";

/// Donut of admissions by ICSAP flag with the grand total as subtitle.
pub fn chart(split: &BinarySplit, style: &ChartStyle) -> Chart {
    let slices: Vec<DataPoint> = if split.total > 0 {
        split
            .rows
            .iter()
            .map(|row| {
                DataPointItem::new(row.admissions as f64)
                    .name(row.label.as_str())
                    .item_style(ItemStyle::new().color(style.palette.flag_color(&row.label)))
                    .into()
            })
            .collect()
    } else {
        Vec::new()
    };

    Chart::new()
        .title(
            Title::new()
                .text(TITLE)
                .subtext(format!("Total: {}", format_thousands(split.total)))
                .left("center"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom").left("center"))
        .series(
            Pie::new()
                .name("Internações")
                .radius(vec!["50%", "75%"])
                .label(Label::new().show(true).formatter("{c} ({d}%)"))
                .data(slices),
        )
}
