use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CategoryColumn;
use crate::state::AppState;

/// A sidebar interaction, applied after the widgets are drawn.
enum FilterAction {
    Toggle(CategoryColumn, String),
    All(CategoryColumn),
    None(CategoryColumn),
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter the data");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut actions = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for &column in &state.config.dashboard.filter_columns {
                let all_values = dataset.distinct_values(column);
                let n_selected = all_values
                    .iter()
                    .filter(|v| state.selection.is_selected(column, v))
                    .count();
                // Nothing ticked shows everything, same as everything ticked.
                let header_text = if n_selected == 0 {
                    format!("{column}  (all)")
                } else {
                    format!("{column}  ({n_selected}/{})", all_values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.header())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                actions.push(FilterAction::All(column));
                            }
                            if ui.small_button("None").clicked() {
                                actions.push(FilterAction::None(column));
                            }
                        });

                        for value in all_values {
                            let mut checked = state.selection.is_selected(column, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                actions.push(FilterAction::Toggle(column, value.clone()));
                            }
                        }
                    });
            }
        });

    for action in actions {
        match action {
            FilterAction::Toggle(column, value) => state.toggle_filter_value(column, &value),
            FilterAction::All(column) => state.select_all(column),
            FilterAction::None(column) => state.select_none(column),
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
        });

        ui.separator();

        if let Some(view) = &state.view {
            ui.label(format!("{} orders loaded, {} shown", view.total, view.visible));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are already logged and shown in the status line.
        let _ = state.open(&path);
    }
}
