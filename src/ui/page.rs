use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::assets::{Asset, AssetKind};
use crate::data::model::Record;
use crate::pages::{DatasetSummary, Section};
use crate::state::AppState;

use super::plot;

// ---------------------------------------------------------------------------
// Central panel – the current page
// ---------------------------------------------------------------------------

/// Draw the current page view. Returns a message for the status line when a
/// user action (saving a download) fails.
pub fn page_view(ui: &mut Ui, state: &AppState) -> Option<String> {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.spinner();
        });
        return None;
    };

    let mut message = None;
    let mut chart_index = 0;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for section in &view.sections {
                match section {
                    Section::Heading(text) => {
                        ui.add_space(6.0);
                        ui.heading(text);
                    }
                    Section::Text(text) => text_block(ui, text),
                    Section::Notice(text) => {
                        ui.label(RichText::new(text).color(Color32::YELLOW));
                    }
                    Section::Summary(summary) => summary_grid(ui, summary),
                    Section::Preview(rows) => preview_table(ui, rows),
                    Section::Chart(Ok(spec)) => {
                        plot::chart(ui, spec, &state.color_map, chart_index);
                        chart_index += 1;
                    }
                    Section::Chart(Err(e)) => {
                        ui.label(RichText::new(format!("Chart unavailable: {e}")).color(Color32::RED));
                    }
                    Section::Download { kind, asset } => {
                        if let Some(msg) = download_row(ui, *kind, asset) {
                            message = Some(msg);
                        }
                    }
                    Section::Code { title, source } => code_block(ui, title, source),
                }
                ui.add_space(8.0);
            }
        });
    message
}

fn text_block(ui: &mut Ui, text: &str) {
    for line in text.lines() {
        match line.strip_prefix("- ") {
            Some(item) => {
                ui.horizontal_wrapped(|ui: &mut Ui| {
                    ui.label("•");
                    ui.label(item);
                });
            }
            None => {
                ui.label(line);
            }
        }
    }
}

fn summary_grid(ui: &mut Ui, summary: &DatasetSummary) {
    let years = match (summary.first_year, summary.last_year) {
        (Some(first), Some(last)) => format!("{first}–{last}"),
        _ => "–".to_string(),
    };
    egui::Grid::new("dataset_summary")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (label, value) in [
                ("Records", summary.rows.to_string()),
                ("Countries", summary.countries.to_string()),
                ("Continents", summary.continents.to_string()),
                ("Years", years),
            ] {
                ui.strong(label);
                ui.label(value);
                ui.end_row();
            }
            for (continent, countries) in &summary.countries_per_continent {
                ui.label(format!("  {continent}"));
                ui.label(format!("{countries} countries"));
                ui.end_row();
            }
        });
}

fn preview_table(ui: &mut Ui, rows: &[Record]) {
    ui.strong("First rows");
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(80.0), 5)
        .header(20.0, |mut header| {
            for name in ["country", "continent", "year", "pop", "lifeExp", "gdpPercap"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for r in rows {
                body.row(18.0, |mut row| {
                    let cells = [
                        r.country.clone(),
                        r.continent.to_string(),
                        r.year.to_string(),
                        r.pop.to_string(),
                        format!("{:.1}", r.life_exp),
                        format!("{:.1}", r.gdp_percap),
                    ];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}

fn download_row(
    ui: &mut Ui,
    kind: AssetKind,
    asset: &Result<Asset, crate::error::AssetError>,
) -> Option<String> {
    let mut message = None;
    ui.horizontal(|ui: &mut Ui| match asset {
        Ok(asset) => {
            if ui.button(kind.button_label()).clicked() {
                let ext = asset
                    .file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_string())
                    .unwrap_or_default();
                if let Err(msg) = save_bytes(&asset.file_name, asset.mime(), &[&ext], &asset.bytes) {
                    message = Some(msg);
                }
            }
            ui.label(RichText::new(format!("{} ({} KB)", asset.file_name, asset.bytes.len() / 1024)).weak());
        }
        Err(e) => {
            ui.add_enabled(false, egui::Button::new(kind.button_label()));
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
    });
    message
}

fn code_block(ui: &mut Ui, title: &str, source: &str) {
    egui::CollapsingHeader::new(RichText::new(title).strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .id_salt("code_block")
                .max_height(320.0)
                .show(ui, |ui: &mut Ui| {
                    let mut text = source;
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
        });
}

/// Ask for a destination and write `bytes` there. A cancelled dialog is not
/// an error.
pub fn save_bytes(
    file_name: &str,
    filter_name: &str,
    extensions: &[&str],
    bytes: &[u8],
) -> Result<(), String> {
    let Some(path) = rfd::FileDialog::new()
        .set_file_name(file_name)
        .add_filter(filter_name, extensions)
        .save_file()
    else {
        return Ok(());
    };

    match std::fs::write(&path, bytes) {
        Ok(()) => {
            log::info!("Saved {}", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to save {}: {e}", path.display());
            Err(format!("Error: could not save {}: {e}", path.display()))
        }
    }
}
