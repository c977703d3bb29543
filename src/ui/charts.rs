use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color::generate_palette;
use crate::data::aggregate::{BoxStats, GroupRow, Share};
use crate::data::model::KeyValue;

use super::format::{format_currency, format_percent};

pub const PLOT_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Plot x coordinate of a calendar date.
pub fn date_x(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

fn date_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

/// Axis formatter that prints `labels[i]` at integer position `i`.
fn category_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn base_plot(id: &str) -> Plot<'static> {
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
}

/// Card frame with a bold title, shared by every chart.
pub fn card(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(RichText::new(title).strong().size(15.0));
        ui.add_space(4.0);
        add_contents(ui);
    });
}

// ---------------------------------------------------------------------------
// Chart primitives
// ---------------------------------------------------------------------------

/// One line per series over dates. Each series is `(name, colour, points)`.
/// With `filled`, the area down to zero is shaded.
pub fn date_lines(ui: &mut Ui, id: &str, filled: bool, series: Vec<(String, Color32, Vec<[f64; 2]>)>) {
    base_plot(id).x_axis_formatter(date_label).show(ui, |plot_ui| {
        for (name, color, pts) in series {
            let points: PlotPoints = pts.into_iter().collect();
            let mut line = Line::new(points).name(&name).color(color).width(2.0);
            if filled {
                line = line.fill(0.0);
            }
            plot_ui.line(line);
        }
    });
}

/// Vertical bars, one per category, each with its own colour.
pub fn category_bars(ui: &mut Ui, id: &str, series_name: &str, bars: Vec<(String, f64, Color32)>) {
    let labels: Vec<String> = bars.iter().map(|(l, _, _)| l.clone()).collect();
    let bars: Vec<Bar> = bars
        .into_iter()
        .enumerate()
        .map(|(i, (label, value, color))| {
            Bar::new(i as f64, value).name(label).fill(color).width(0.7)
        })
        .collect();

    base_plot(id)
        .x_axis_formatter(category_labels(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(series_name));
        });
}

/// Side-by-side bars: several measures per category.
pub fn grouped_bars(ui: &mut Ui, id: &str, labels: Vec<String>, series: Vec<(String, Vec<f64>)>) {
    let colors = generate_palette(series.len());
    let width = 0.8 / series.len().max(1) as f64;

    let charts: Vec<BarChart> = series
        .into_iter()
        .zip(colors)
        .enumerate()
        .map(|(s, ((name, values), color))| {
            let offset = (s as f64 + 0.5) * width - 0.4;
            let bars = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| Bar::new(i as f64 + offset, v).width(width * 0.95))
                .collect();
            BarChart::new(bars).name(name).color(color)
        })
        .collect();

    base_plot(id)
        .x_axis_formatter(category_labels(labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Stacked bars from a grouped sum keyed by `[category, stack]`.
pub fn stacked_bars(ui: &mut Ui, id: &str, rows: &[GroupRow]) {
    let mut categories: Vec<String> = Vec::new();
    let mut stacks: Vec<String> = Vec::new();
    for g in rows {
        let (Some(cat), Some(stack)) = (g.keys.first(), g.keys.get(1)) else {
            continue;
        };
        let (cat, stack) = (cat.to_string(), stack.to_string());
        if !categories.contains(&cat) {
            categories.push(cat);
        }
        if !stacks.contains(&stack) {
            stacks.push(stack);
        }
    }
    let colors = generate_palette(stacks.len());

    let mut charts: Vec<BarChart> = Vec::new();
    for (stack, color) in stacks.iter().zip(colors) {
        let bars: Vec<Bar> = rows
            .iter()
            .filter(|g| g.keys.get(1).map(ToString::to_string).as_deref() == Some(stack.as_str()))
            .filter_map(|g| {
                let cat = g.keys.first()?.to_string();
                let i = categories.iter().position(|c| *c == cat)?;
                Some(Bar::new(i as f64, g.values.first().copied().unwrap_or(0.0)).width(0.7))
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars).name(stack).color(color).stack_on(&below);
        charts.push(chart);
    }

    base_plot(id)
        .x_axis_formatter(category_labels(categories))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Box plots. `groups` are `(x position, legend name, colour, stats)`.
pub fn box_plots(
    ui: &mut Ui,
    id: &str,
    labels: Vec<String>,
    box_width: f64,
    groups: Vec<(f64, String, Color32, BoxStats)>,
) {
    base_plot(id)
        .x_axis_formatter(category_labels(labels))
        .show(ui, |plot_ui| {
            for (x, name, color, s) in groups {
                let elem = BoxElem::new(x, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                    .name(format!("{name} (n={})", s.n))
                    .fill(color.gamma_multiply(0.4))
                    .stroke(egui::Stroke::new(1.5, color))
                    .box_width(box_width);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(name));
            }
        });
}

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 10.0;

/// Marker radius for a bubble of `size` when the largest bubble is `max`.
/// Area grows linearly with `size`; non-positive sizes get the smallest marker.
pub fn bubble_radius(size: f64, max: f64) -> f32 {
    if size <= 0.0 || max <= 0.0 {
        return MIN_RADIUS;
    }
    let t = (size / max).min(1.0).sqrt() as f32;
    MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * t
}

/// Bubble scatter. Each series is `(name, colour, [x, y, size])`; series
/// share a name per category, so the legend shows each category once.
pub fn scatter(ui: &mut Ui, id: &str, x_label: &str, y_label: &str, series: Vec<(String, Color32, Vec<[f64; 3]>)>) {
    let max = series
        .iter()
        .flat_map(|(_, _, pts)| pts.iter().map(|p| p[2]))
        .fold(0.0_f64, f64::max);

    base_plot(id)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for (name, color, pts) in series {
                for [x, y, size] in pts {
                    plot_ui.points(
                        Points::new(vec![[x, y]])
                            .name(&name)
                            .color(color)
                            .radius(bubble_radius(size, max)),
                    );
                }
            }
        });
}

/// Horizontal share bars with percentage labels (segment distribution).
pub fn share_list(ui: &mut Ui, shares: &[Share]) {
    let colors = generate_palette(shares.len());
    for (share, color) in shares.iter().zip(colors) {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(share.key.to_string()).color(color).strong());
            ui.label(format!("{}  ({})", format_currency(share.value), format_percent(share.percent)));
        });
        let fraction = (share.percent / 100.0).clamp(0.0, 1.0) as f32;
        ui.add(egui::ProgressBar::new(fraction).fill(color));
    }
}

/// Label of a single-component group key.
pub fn key_label(keys: &[KeyValue]) -> String {
    keys.first().map(ToString::to_string).unwrap_or_default()
}
