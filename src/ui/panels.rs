use eframe::egui::{self, Color32, ComboBox, RichText, ScrollArea, Slider, TextEdit, Ui};

use crate::data::controls::{Combine, FilterControl, FilterInputs, offered_selection};
use crate::data::model::CellValue;
use crate::state::{AppState, LoadPhase};
use crate::ui::results;

// ---------------------------------------------------------------------------
// Left side panel – data source + filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            source_section(ui, state);
            ui.add_space(8.0);

            ui.heading("Filters");
            ui.separator();
            filter_section(ui, state);
        });
}

fn source_section(ui: &mut Ui, state: &mut AppState) {
    let open = state.phase != LoadPhase::Ready;
    egui::CollapsingHeader::new(RichText::new("Data source").strong())
        .id_salt("data_source")
        .default_open(open)
        .show(ui, |ui: &mut Ui| {
            ui.label("Published CSV URL");
            let resp = ui.add(
                TextEdit::singleline(&mut state.source_inputs.csv_url)
                    .hint_text("https://docs.google.com/spreadsheets/d/.../export?format=csv"),
            );
            let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            egui::CollapsingHeader::new("Spreadsheet API (fallback)")
                .id_salt("sheets_api")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    let inputs = &mut state.source_inputs;
                    ui.label("Spreadsheet id or URL");
                    ui.text_edit_singleline(&mut inputs.spreadsheet_id);
                    ui.label("Worksheet (title or id, optional)");
                    ui.text_edit_singleline(&mut inputs.worksheet);
                    ui.label("Service-account credentials (JSON, file path or base64)");
                    ui.add(TextEdit::singleline(&mut inputs.credentials).password(true));
                });

            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Load").clicked() || submitted {
                    state.load();
                }
                if ui
                    .add_enabled(state.dataset.is_some(), egui::Button::new("Reload"))
                    .clicked()
                {
                    state.reload();
                }
            });
        });
}

fn filter_section(ui: &mut Ui, state: &mut AppState) {
    let dataset = match (&state.dataset, &state.phase) {
        (Some(ds), LoadPhase::Ready) => ds,
        _ => {
            ui.label("No dataset loaded.");
            return;
        }
    };
    let inputs = &mut state.inputs;

    for ctl in &dataset.controls {
        let col = ctl.column.as_str();
        match &ctl.control {
            FilterControl::Choice { options } => choice_widget(ui, inputs, col, options),
            FilterControl::Range { min, max } => range_widget(ui, inputs, col, *min, *max),
            FilterControl::Search => search_widget(ui, inputs, col),
        }
        ui.add_space(4.0);
    }

    ui.separator();
    if ui.button("Clear filters").clicked() {
        state.clear_filters();
    } else {
        // Recompute visible rows after any widget change.
        state.refilter();
    }
}

fn choice_widget(ui: &mut Ui, inputs: &mut FilterInputs, col: &str, options: &[CellValue]) {
    let selected = inputs.selections.entry(col.to_string()).or_default();

    // Show count of selected / total in the header
    let n_selected = offered_selection(selected, options).len();
    let header_text = format!("{col}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(("choice", col))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if options.is_empty() {
                ui.label("No values.");
                return;
            }
            if ui.small_button("None").clicked() {
                selected.clear();
            }
            for val in options {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                }
            }
        });
}

fn range_widget(ui: &mut Ui, inputs: &mut FilterInputs, col: &str, min: i64, max: i64) {
    ui.strong(format!("{col} range"));
    let (mut start, mut end) = inputs.range_for(col, min, max);
    let changed = ui.add(Slider::new(&mut start, min..=max).text("from")).changed()
        | ui.add(Slider::new(&mut end, min..=max).text("to")).changed();
    if changed {
        inputs
            .ranges
            .insert(col.to_string(), (start.min(end), start.max(end)));
    }
}

fn search_widget(ui: &mut Ui, inputs: &mut FilterInputs, col: &str) {
    let search = inputs.searches.entry(col.to_string()).or_default();
    ui.strong(format!("{col} contains (comma-separated)"));
    ui.horizontal(|ui: &mut Ui| {
        ui.add(
            TextEdit::singleline(&mut search.text)
                .hint_text("e.g. london, paris")
                .desired_width(150.0),
        );
        ComboBox::from_id_salt(("combine", col))
            .selected_text(search.combine.label())
            .width(60.0)
            .show_ui(ui, |ui: &mut Ui| {
                for c in [Combine::Or, Combine::And] {
                    ui.selectable_value(&mut search.combine, c, c.label());
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_export = state.phase == LoadPhase::Ready;
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                results::save_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded from {}, {} visible",
                ds.table.len(),
                ds.key,
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let text = RichText::new(msg);
            if msg.starts_with("Error") {
                ui.label(text.color(Color32::RED));
            } else {
                ui.label(text);
            }
        }
    });
}
