use std::collections::BTreeMap;

use eframe::egui::{Color32, RichText, Ui};

use crate::data::aggregate::{box_stats, group_sum, kpis, share_of_total};
use crate::data::model::{GroupKey, KeyValue, Measure, Record};
use crate::state::AppState;

use super::charts::{self, card, date_x, key_label};
use super::format::{format_count, format_currency, format_percent};

const SALES_COLOR: Color32 = Color32::from_rgb(0x00, 0x78, 0xd4);
const PROFIT_COLOR: Color32 = Color32::from_rgb(0xff, 0x8c, 0x00);

// ---------------------------------------------------------------------------
// Executive summary
// ---------------------------------------------------------------------------

pub fn executive_summary(ui: &mut Ui, rows: &[&Record]) {
    let k = kpis(rows);
    ui.columns(4, |cols| {
        kpi_card(&mut cols[0], "Total Sales", format_currency(k.sales));
        kpi_card(&mut cols[1], "Net Profit", format_currency(k.profit));
        kpi_card(&mut cols[2], "Units Sold", format_count(k.units_sold));
        kpi_card(&mut cols[3], "Margin %", format_percent(k.margin_percent));
    });
    ui.label(format!("{} records in view", format_count(k.rows as f64)));
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        card(&mut cols[0], "Sales & Profit Trend", |ui| {
            let trend = group_sum(rows, &[GroupKey::Date], &[Measure::Sales, Measure::Profit]);
            let mut sales = Vec::with_capacity(trend.len());
            let mut profit = Vec::with_capacity(trend.len());
            for g in &trend {
                if let Some(d) = g.keys.first().and_then(KeyValue::as_date) {
                    sales.push([date_x(d), g.values[0]]);
                    profit.push([date_x(d), g.values[1]]);
                }
            }
            charts::date_lines(
                ui,
                "trend",
                true,
                vec![
                    ("Sales".to_string(), SALES_COLOR, sales),
                    ("Profit".to_string(), PROFIT_COLOR, profit),
                ],
            );
        });
        card(&mut cols[1], "Segment Distribution", |ui| {
            charts::share_list(ui, &share_of_total(rows, GroupKey::Segment, Measure::Sales));
        });
    });
}

fn kpi_card(ui: &mut Ui, title: &str, value: String) {
    card(ui, title, |ui| {
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Regional analytics
// ---------------------------------------------------------------------------

pub fn regional(ui: &mut Ui, state: &AppState, rows: &[&Record]) {
    let by_country = group_sum(rows, &[GroupKey::Country], &[Measure::Sales, Measure::Profit]);
    let colors = &state.country_colors;

    ui.columns(2, |cols| {
        card(&mut cols[0], "Sales by Country", |ui| {
            let mut ranked: Vec<(String, f64)> =
                by_country.iter().map(|g| (g.label(), g.values[0])).collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            let bars = ranked
                .into_iter()
                .map(|(name, v)| {
                    let c = colors.color_for(&name);
                    (name, v, c)
                })
                .collect();
            charts::category_bars(ui, "sales_by_country", "Sales", bars);
        });
        card(&mut cols[1], "Profit by Country", |ui| {
            let bars = by_country
                .iter()
                .map(|g| {
                    let name = g.label();
                    let c = colors.color_for(&name);
                    (name, g.values[1], c)
                })
                .collect();
            charts::category_bars(ui, "profit_by_country", "Profit", bars);
        });
    });
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        card(&mut cols[0], "Sale Distribution by Country", |ui| {
            let stats = box_stats(rows, &[GroupKey::Country], Measure::Sales);
            let labels: Vec<String> = stats.iter().map(|(k, _)| key_label(k)).collect();
            let groups = stats
                .into_iter()
                .enumerate()
                .map(|(i, (k, s))| {
                    let name = key_label(&k);
                    let c = colors.color_for(&name);
                    (i as f64, name, c, s)
                })
                .collect();
            charts::box_plots(ui, "sales_box", labels, 0.5, groups);
        });
        card(&mut cols[1], "Units vs Profit", |ui| {
            // Bubble size follows sales.
            let mut per_product: BTreeMap<&str, Vec<[f64; 3]>> = BTreeMap::new();
            for r in rows {
                per_product
                    .entry(r.product.as_str())
                    .or_default()
                    .push([r.units_sold, r.profit, r.sales]);
            }
            let series = per_product
                .into_iter()
                .map(|(p, pts)| (p.to_string(), state.product_colors.color_for(p), pts))
                .collect();
            charts::scatter(ui, "units_profit", "Units Sold", "Profit", series);
        });
    });
}

// ---------------------------------------------------------------------------
// Product deep-dive
// ---------------------------------------------------------------------------

pub fn product(ui: &mut Ui, state: &AppState, rows: &[&Record]) {
    ui.columns(2, |cols| {
        card(&mut cols[0], "Sales by Product and Segment", |ui| {
            let groups = group_sum(rows, &[GroupKey::Product, GroupKey::Segment], &[Measure::Sales]);
            charts::stacked_bars(ui, "product_segment", &groups);
        });
        card(&mut cols[1], "Monthly Sales by Product", |ui| {
            let groups = group_sum(rows, &[GroupKey::Date, GroupKey::Product], &[Measure::Sales]);
            let mut per_product: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
            for g in &groups {
                let (Some(d), Some(p)) = (g.keys.first().and_then(KeyValue::as_date), g.keys.get(1)) else {
                    continue;
                };
                per_product
                    .entry(p.to_string())
                    .or_default()
                    .push([date_x(d), g.values[0]]);
            }
            let series = per_product
                .into_iter()
                .map(|(p, pts)| {
                    let c = state.product_colors.color_for(&p);
                    (p, c, pts)
                })
                .collect();
            charts::date_lines(ui, "monthly_by_product", false, series);
        });
    });
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        card(&mut cols[0], "COGS vs Sales", |ui| {
            let groups = group_sum(rows, &[GroupKey::Product], &[Measure::Sales, Measure::Cogs]);
            let labels = groups.iter().map(|g| g.label()).collect();
            let sales = groups.iter().map(|g| g.values[0]).collect();
            let cogs = groups.iter().map(|g| g.values[1]).collect();
            charts::grouped_bars(
                ui,
                "cogs_sales",
                labels,
                vec![("Sales".to_string(), sales), ("COGS".to_string(), cogs)],
            );
        });
        card(&mut cols[1], "Discount Impact on Profit", |ui| {
            discount_impact(ui, rows);
        });
    });
}

/// Profit box plots per product, one box per discount band side by side.
fn discount_impact(ui: &mut Ui, rows: &[&Record]) {
    let stats = box_stats(rows, &[GroupKey::Product, GroupKey::DiscountBand], Measure::Profit);

    let mut products: Vec<String> = Vec::new();
    let mut bands: Vec<String> = Vec::new();
    for (k, _) in &stats {
        if let (Some(p), Some(b)) = (k.first(), k.get(1)) {
            let (p, b) = (p.to_string(), b.to_string());
            if !products.contains(&p) {
                products.push(p);
            }
            if !bands.contains(&b) {
                bands.push(b);
            }
        }
    }
    let palette = crate::color::generate_palette(bands.len());
    let step = 0.8 / bands.len().max(1) as f64;

    let groups = stats
        .into_iter()
        .filter_map(|(k, s)| {
            let p = k.first()?.to_string();
            let b = k.get(1)?.to_string();
            let pi = products.iter().position(|x| *x == p)?;
            let bi = bands.iter().position(|x| *x == b)?;
            let x = pi as f64 + (bi as f64 + 0.5) * step - 0.4;
            Some((x, b, palette[bi], s))
        })
        .collect();
    charts::box_plots(ui, "discount_impact", products, step * 0.9, groups);
}
