use std::time::Duration;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{page, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and start fetching the configured dataset.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let source = state.source.clone();
        state.start_loading(source, false);
        state.refresh_view();
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loading();
        if self.state.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(msg) = page::page_view(ui, &self.state) {
                self.state.status_message = Some(msg);
            }
        });
    }
}
