use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Measure, Record};
use crate::state::AppState;

use super::format::format_amount;

const ROW_HEIGHT: f32 = 20.0;

/// Case-insensitive substring match over the text columns of a record.
/// An empty (or blank) query matches everything.
pub fn matches_query(record: &Record, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let date = record.date.format("%Y-%m-%d").to_string();
    let fields = [
        date.as_str(),
        record.country.as_str(),
        record.product.as_str(),
        record.segment.as_str(),
        record.discount_band.as_str(),
    ];
    let found = fields
        .into_iter()
        .chain(record.extra.values().map(String::as_str))
        .any(|field| field.to_lowercase().contains(&query));
    found
}

/// Number of pages needed for `n` rows (at least one).
pub fn page_count(n: usize, page_size: usize) -> usize {
    n.div_ceil(page_size.max(1)).max(1)
}

/// Render the paged, searchable master data table.
pub fn data_explorer(ui: &mut Ui, state: &mut AppState, rows: &[&Record]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search:");
        if ui.text_edit_singleline(&mut state.search).changed() {
            state.explorer_page = 0;
        }
        if ui.small_button("Clear").clicked() {
            state.search.clear();
            state.explorer_page = 0;
        }
    });

    let matching: Vec<&Record> = rows
        .iter()
        .copied()
        .filter(|r| matches_query(r, &state.search))
        .collect();

    let pages = page_count(matching.len(), state.page_size);
    state.explorer_page = state.explorer_page.min(pages - 1);

    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(state.explorer_page > 0, egui::Button::new("◀"))
            .clicked()
        {
            state.explorer_page -= 1;
        }
        ui.label(format!(
            "Page {} of {pages}  ({} rows)",
            state.explorer_page + 1,
            matching.len()
        ));
        if ui
            .add_enabled(state.explorer_page + 1 < pages, egui::Button::new("▶"))
            .clicked()
        {
            state.explorer_page += 1;
        }
    });
    ui.separator();

    let start = state.explorer_page * state.page_size;
    let page_rows: Vec<&Record> = matching
        .iter()
        .skip(start)
        .take(state.page_size)
        .copied()
        .collect();

    let text_headers = ["Date", "Country", "Product", "Segment", "Discount Band"];

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(80.0), text_headers.len() - 1)
        .columns(Column::auto().at_least(90.0), Measure::ALL.len())
        .header(ROW_HEIGHT, |mut header| {
            for h in text_headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
            for m in Measure::ALL {
                header.col(|ui: &mut Ui| {
                    ui.strong(m.label());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, page_rows.len(), |mut row| {
                let r = page_rows[row.index()];
                let date = r.date.format("%Y-%m-%d").to_string();
                for text in [&date, &r.country, &r.product, &r.segment, &r.discount_band] {
                    row.col(|ui: &mut Ui| {
                        ui.label(text.as_str());
                    });
                }
                for m in Measure::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(format_amount(r.measure(m)));
                    });
                }
            });
        });
}
