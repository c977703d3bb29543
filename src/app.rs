use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::AppConfig;
use crate::data::model::Dataset;
use crate::state::{AppState, Page};
use crate::ui::{pages, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashApp {
    pub state: AppState,
}

impl SalesDashApp {
    pub fn new(config: &AppConfig, dataset: Option<Dataset>) -> Self {
        let mut state = AppState::new(config.page_size);
        if let Some(ds) = dataset {
            state.set_dataset(ds);
        }
        Self { state }
    }
}

impl eframe::App for SalesDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central_panel(ui, &mut self.state);
        });
    }
}

fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    // Aggregates are derived from the current view on every frame.
    let view = state.session.view.clone();
    let rows = view.rows(&dataset);

    ui.heading(state.page.title());
    if view.is_empty() {
        ui.label(RichText::new("No records match the current filters.").color(Color32::YELLOW));
    }
    ui.separator();

    match state.page {
        Page::ExecutiveSummary => {
            ScrollArea::vertical().show(ui, |ui| pages::executive_summary(ui, &rows));
        }
        Page::RegionalAnalytics => {
            ScrollArea::vertical().show(ui, |ui| pages::regional(ui, state, &rows));
        }
        Page::ProductDeepDive => {
            ScrollArea::vertical().show(ui, |ui| pages::product(ui, state, &rows));
        }
        Page::DataExplorer => table::data_explorer(ui, state, &rows),
    }
}
