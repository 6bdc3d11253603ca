use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::export::{EXPORT_FILE_NAME, EXPORT_MIME};
use crate::state::{AppState, LoadPhase};

// ---------------------------------------------------------------------------
// Results grid (central panel)
// ---------------------------------------------------------------------------

/// Render the central panel. Anything but a ready table halts the pass with a
/// message in place of the results.
pub fn results_panel(ui: &mut Ui, state: &mut AppState) {
    match &state.phase {
        LoadPhase::AwaitingSource => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(
                    "Enter a published CSV URL (File → Share → Publish to web → CSV) \
                     or spreadsheet API credentials in the Data source panel.",
                );
            });
            return;
        }
        LoadPhase::Failed(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
            ui.label(
                "Make sure the sheet is published to the web as CSV, \
                 or that the service account can read it.",
            );
            return;
        }
        LoadPhase::Empty => {
            ui.heading("No data available.");
            return;
        }
        LoadPhase::Ready => {}
    }
    let Some(ds) = &state.dataset else {
        return;
    };

    ui.heading("Results");
    let mut download = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Showing {} of {} rows",
            state.visible_indices.len(),
            ds.table.len()
        ));
        download = ui.button("Download filtered CSV").clicked();
    });
    ui.separator();

    let table = &ds.table;
    let rows = &state.visible_indices;
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(
                TableColumn::auto().at_least(60.0).clip(true),
                table.columns().len(),
            )
            .header(20.0, |mut header| {
                for name in table.column_names() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let idx = rows[row.index()];
                    for cell in table.row(idx) {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });

    if download {
        save_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

pub fn save_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save filtered results")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter(format!("CSV ({EXPORT_MIME})"), &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(n) => {
                state.status_message = Some(format!("Saved {n} rows to {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
