use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{ActiveView, AppState, CONTAMINATION_MAX, CONTAMINATION_MIN};

// ---------------------------------------------------------------------------
// Left side panel – analysis controls
// ---------------------------------------------------------------------------

/// Render the left control panel: the three analysis triggers and the
/// contamination slider gating the third.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analyses");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    if ui
        .selectable_label(state.active_view == ActiveView::Preview, "Data preview")
        .clicked()
    {
        state.active_view = ActiveView::Preview;
    }

    ui.separator();

    if ui.button("Run summary").clicked() {
        state.run_summary();
    }
    if ui.button("Run correlation").clicked() {
        state.run_correlation();
    }

    ui.separator();

    ui.strong("Anomaly detection");
    ui.add(
        egui::Slider::new(
            &mut state.contamination,
            CONTAMINATION_MIN..=CONTAMINATION_MAX,
        )
        .text("contamination"),
    );
    if ui.button("Detect anomalies").clicked() {
        state.run_anomalies();
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
        });

        ui.separator();

        if let Some(table) = &state.table {
            let source = state.source_name.as_deref().unwrap_or("table");
            ui.label(format!(
                "{source}: {} rows × {} columns",
                table.n_rows(),
                table.n_cols()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows × {} columns from {}",
                    table.n_rows(),
                    table.n_cols(),
                    path.display()
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                state.set_table(table, name);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
