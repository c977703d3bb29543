use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::export_csv;
use crate::data::loader::load_file;
use crate::data::model::Dimension;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – global filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("BI PANEL").strong());
    });
    ui.separator();
    ui.strong("GLOBAL FILTERS");
    ui.add_space(4.0);

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = dataset.lov.get(dim);
                let n_selected = state.session.selection.get(dim).len();
                let header_text = format!("{}  ({n_selected}/{})", plural(dim), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(dim == Dimension::Country)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.session.selection.get(dim).contains(val);
                            let mut text = RichText::new(val);
                            match dim {
                                Dimension::Product => text = text.color(state.product_colors.color_for(val)),
                                Dimension::Country => text = text.color(state.country_colors.color_for(val)),
                                Dimension::Segment => {}
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
            }

            ui.separator();
            if ui.button("Export CSV…").clicked() {
                save_file_dialog(state);
            }
        });
}

fn plural(dim: Dimension) -> &'static str {
    match dim {
        Dimension::Country => "Countries",
        Dimension::Product => "Products",
        Dimension::Segment => "Segments",
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, page navigation and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export CSV…")).clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            ui.selectable_value(&mut state.page, page, page.title());
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.session.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, &path);
    }
}

/// Load `path` into `state`; on failure keep the previous dataset.
pub fn load_into(state: &mut AppState, path: &Path) {
    match load_file(path) {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => state.status_message = Some(format!("Error: {e}")),
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let Some(ds) = state.dataset.clone() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .add_filter("CSV", &["csv"])
        .set_file_name("filtered_data.csv")
        .save_file();

    if let Some(path) = file {
        let result = export_csv(&path, &ds, &state.session.view)
            .with_context(|| format!("exporting to {}", path.display()));
        match result {
            Ok(()) => {
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
