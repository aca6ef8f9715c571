mod app;
mod assets;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod pages;
mod state;
mod ui;

use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gapminder Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
