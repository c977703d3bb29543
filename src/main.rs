mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashApp;
use config::AppConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();

    // An explicitly requested dataset must load; the default one is optional.
    let dataset = if config.explicit_path || config.data_path.exists() {
        let ds = data::loader::load_file(&config.data_path)
            .with_context(|| format!("loading {}", config.data_path.display()))?;
        if ds.is_empty() {
            log::warn!("{} has no data rows", config.data_path.display());
        }
        Some(ds)
    } else {
        log::warn!(
            "No dataset at {}; starting empty (File → Open…)",
            config.data_path.display()
        );
        None
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Enterprise BI Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SalesDashApp::new(&config, dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
