use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::data::model::Category;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (category, title) in [
                (Category::RaceEthnicity, "1. Race/Ethnicity"),
                (Category::TestPreparation, "2. Test Preparation Status"),
            ] {
                multi_select(ui, state, category, title, &table.options(category));
                ui.separator();
            }

            // ---- Average score range ----
            ui.strong("3. Average Score Range");
            let (lo, hi) = table.avg_score_bounds();
            if let Some(sel) = &state.selection {
                let mut min = sel.avg_range.min;
                let mut max = sel.avg_range.max;
                let changed_min = ui
                    .add(egui::Slider::new(&mut min, lo..=hi).text("min").step_by(1.0))
                    .changed();
                let changed_max = ui
                    .add(egui::Slider::new(&mut max, lo..=hi).text("max").step_by(1.0))
                    .changed();
                if changed_min || changed_max {
                    state.set_range(min, max);
                }
            }
            ui.separator();

            // ---- Chart selector ----
            ui.strong("4. Chart 1 Type");
            let mut kind = state.chart_kind;
            egui::ComboBox::from_id_salt("chart_kind")
                .selected_text(kind.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in ChartKind::ALL {
                        ui.selectable_value(&mut kind, option, option.label());
                    }
                });
            state.set_chart_kind(kind);
        });
}

/// Checkbox list with All/None buttons for one filterable column.
fn multi_select(ui: &mut Ui, state: &mut AppState, category: Category, title: &str, options: &[String]) {
    let n_selected = state
        .selection
        .as_ref()
        .and_then(|s| s.set(category))
        .map_or(0, |s| s.len());
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(category.column())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(category);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(category);
                }
            });

            for value in options {
                let mut checked = state
                    .selection
                    .as_ref()
                    .and_then(|s| s.set(category))
                    .is_some_and(|s| s.contains(value));
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_filter_value(category, value);
                }
            }
        });
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
                .add_enabled(state.data_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Err(e) = state.reload() {
                    report_error(state, &e);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} students loaded, {} dropped as non-numeric",
                table.len(),
                table.report.rows_dropped
            ));
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
        .set_title("Open student scores")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open(&path) {
            report_error(state, &e);
        }
    }
}

fn report_error(state: &mut AppState, e: &anyhow::Error) {
    log::error!("Failed to load file: {e:#}");
    state.status_message = Some(format!("Error: {e:#}"));
}
