// Chart preparation - scale a series onto the canvas and build axis labels
use crate::domain::chart::{
    AxisLabel, AxisTick, ChartDataset, ChartLayout, ChartPlot, PlotPoint, PreparedChart,
    ValueDomain,
};
use crate::domain::history::HistoricalSample;
use crate::domain::tag::to_fixed1;
use chrono::{FixedOffset, Timelike};

pub const NO_DATA_MESSAGE: &str = "No data available";

/// Gridline intervals on the value axis (six labels).
const Y_INTERVALS: usize = 5;
/// Roughly this many time labels are shown along the x axis.
const X_LABEL_TARGET: usize = 6;
const DOMAIN_PADDING: f64 = 0.1;

pub fn prepare_chart(
    series: &[HistoricalSample],
    unit: &str,
    layout: &ChartLayout,
    tz: &FixedOffset,
) -> PreparedChart {
    if series.is_empty() {
        return PreparedChart::Placeholder {
            message: NO_DATA_MESSAGE.to_string(),
            x: layout.width / 2.0,
            y: layout.height / 2.0,
        };
    }

    let domain = value_domain(series);
    let labels: Vec<String> = series.iter().map(|s| time_label(s, tz)).collect();

    PreparedChart::Plot(ChartPlot {
        domain,
        y_ticks: y_ticks(&domain, unit, layout),
        x_labels: x_labels(&labels, layout),
        points: plot_points(series, &domain, layout),
        dataset: ChartDataset {
            label: unit.to_string(),
            values: series.iter().map(|s| s.value).collect(),
            tooltips: series.iter().map(|s| axis_value(s.value, unit)).collect(),
            labels,
        },
    })
}

/// Min/max of the series widened by 10% of the range on both ends.
/// A flat series uses a range of 1.
pub fn value_domain(series: &[HistoricalSample]) -> ValueDomain {
    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.value), hi.max(s.value))
        });
    let range = if max - min == 0.0 { 1.0 } else { max - min };

    ValueDomain {
        min: min - range * DOMAIN_PADDING,
        max: max + range * DOMAIN_PADDING,
    }
}

fn y_ticks(domain: &ValueDomain, unit: &str, layout: &ChartLayout) -> Vec<AxisTick> {
    (0..=Y_INTERVALS)
        .map(|i| {
            let fraction = i as f64 / Y_INTERVALS as f64;
            let value = domain.max - domain.range() * fraction;
            AxisTick {
                value,
                y: layout.padding_top + layout.plot_height() * fraction,
                label: axis_value(value, unit),
            }
        })
        .collect()
}

fn x_labels(labels: &[String], layout: &ChartLayout) -> Vec<AxisLabel> {
    let count = labels.len();
    let step = count.div_ceil(X_LABEL_TARGET).max(1);

    labels
        .iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0 || *i == count - 1)
        .map(|(i, label)| AxisLabel {
            index: i,
            x: x_position(i, count, layout),
            label: label.clone(),
        })
        .collect()
}

fn plot_points(
    series: &[HistoricalSample],
    domain: &ValueDomain,
    layout: &ChartLayout,
) -> Vec<PlotPoint> {
    series
        .iter()
        .enumerate()
        .map(|(i, sample)| PlotPoint {
            x: x_position(i, series.len(), layout),
            y: layout.plot_bottom()
                - layout.plot_height() * (sample.value - domain.min) / domain.range(),
            value: sample.value,
        })
        .collect()
}

/// Points are spaced by index, not by elapsed time
fn x_position(index: usize, count: usize, layout: &ChartLayout) -> f64 {
    if count <= 1 {
        return layout.padding_left + layout.plot_width() / 2.0;
    }
    layout.padding_left + layout.plot_width() * index as f64 / (count - 1) as f64
}

fn time_label(sample: &HistoricalSample, tz: &FixedOffset) -> String {
    let local = sample.time.with_timezone(tz);
    format!("{}:{:02}", local.hour(), local.minute())
}

fn axis_value(value: f64, unit: &str) -> String {
    format!("{} {}", to_fixed1(value), unit)
}
