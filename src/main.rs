mod app;
mod color;
mod config;
mod data;
mod metrics;
mod state;
mod store;
mod ui;

use std::path::Path;

use app::DataDashApp;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::load_or_default(Path::new("datadash.json"));
    let state = AppState::new(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "DataDash – CSV Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(DataDashApp::new(state)))),
    )
}
