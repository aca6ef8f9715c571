use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::loader::DataSource;
use crate::pages::Page;
use crate::state::AppState;

use super::page::save_bytes;

// ---------------------------------------------------------------------------
// Left side panel – page navigation
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Gapminder");
        ui.label(RichText::new("Country statistics 1952–2007").weak());
    });
    ui.add_space(4.0);
    ui.separator();

    ui.strong("Navigate");
    for page in Page::ALL {
        let mut title = RichText::new(page.title());
        if page.needs_dataset() && state.dataset.is_none() {
            title = title.weak();
        }
        if ui
            .selectable_label(state.page == page, title)
            .clicked()
            && state.page != page
        {
            state.navigate(page);
        }
    }

    ui.separator();
    match &state.dataset {
        Some(ds) => {
            ui.label(format!("{} records", ds.len()));
            ui.label(RichText::new(state.source.to_string()).small().weak());
        }
        None if state.loading => {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.label("Loading dataset…");
            });
        }
        None => {
            ui.label("No dataset loaded.");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.loading, egui::Button::new("Reload from source"))
                .clicked()
            {
                let source = DataSource::Url(state.config.data.url.clone());
                state.start_loading(source, true);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export charts as JSON…").clicked() {
                export_charts(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(state.page.title()).strong());

        if state.loading {
            ui.separator();
            ui.spinner();
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
        .set_title("Open Gapminder data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.start_loading(DataSource::File(path), false);
    }
}

fn export_charts(state: &mut AppState) {
    let json = match state.charts_json() {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize charts: {e}");
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
    };
    let name = format!("{}.json", state.page.title().to_lowercase().replace([' ', '&'], "_"));
    if let Err(msg) = save_bytes(&name, "JSON", &["json"], json.as_bytes()) {
        state.status_message = Some(msg);
    }
}
