use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::{matching_values, ColumnConstraint};
use crate::data::loader;
use crate::data::model::{Column, ColumnProfile};
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_csv_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load Sample Dataset").clicked() {
                load_sample(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: page navigation plus, on the dashboard, the
/// per-column filter widgets.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    for page in Page::ALL {
        ui.selectable_value(&mut state.page, page, page.label());
    }
    ui.separator();

    if state.page != Page::Dashboard {
        return;
    }

    ui.heading("Filter Options");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        ui.label("Use File → Open CSV… or load the sample dataset.");
        return;
    };

    // Clone the column index so we can mutate filters inside the loop.
    let columns: Vec<Column> = dataset.columns.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Which columns carry a filter ----
            egui::CollapsingHeader::new(RichText::new("Select Columns to Filter").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for col in &columns {
                        let mut checked = state.is_filtered(&col.name);
                        if ui
                            .checkbox(&mut checked, format!("{}  ({})", col.name, col.ty))
                            .changed()
                        {
                            if checked {
                                state.add_filter(&col.name);
                            } else {
                                state.remove_filter(&col.name);
                            }
                        }
                    }
                });
            ui.separator();

            // ---- Per-column constraint widgets ----
            for col in &columns {
                if state.is_filtered(&col.name) {
                    constraint_widget(ui, state, col);
                }
            }

            // ---- Load / filter warnings ----
            if !state.load_issues.is_empty() || !state.skipped_constraints.is_empty() {
                ui.separator();
                for issue in &state.load_issues {
                    ui.label(RichText::new(issue.to_string()).color(Color32::YELLOW));
                }
                for skip in &state.skipped_constraints {
                    ui.label(
                        RichText::new(format!("{} filter skipped: {}", skip.column, skip.reason))
                            .color(Color32::YELLOW),
                    );
                }
            }
        });
}

/// The filter widget for one column, dispatched on the constraint tag.
fn constraint_widget(ui: &mut Ui, state: &mut AppState, col: &Column) {
    let Some(constraint) = state.filters.get(&col.name).cloned() else {
        return;
    };

    let header = match &constraint {
        ColumnConstraint::Values { selected, .. } => {
            let total = match &col.profile {
                ColumnProfile::Text { unique } => unique.len(),
                _ => 0,
            };
            format!("{}  ({}/{})", col.name, selected.len(), total)
        }
        _ => format!("Filter {}", col.name),
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(&col.name)
        .default_open(true)
        .show(ui, |ui: &mut Ui| match constraint {
            ColumnConstraint::Range { mut min, mut max } => {
                let ColumnProfile::Numeric { min: lo, max: hi } = &col.profile else {
                    return;
                };
                let changed = ui.add(Slider::new(&mut min, *lo..=*hi).text("min")).changed()
                    | ui.add(Slider::new(&mut max, *lo..=*hi).text("max")).changed();
                if changed {
                    state
                        .filters
                        .insert(col.name.clone(), ColumnConstraint::Range { min, max });
                    state.refilter();
                }
            }
            ColumnConstraint::DateRange { mut start, mut end } => {
                let mut changed = false;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("from");
                    changed |= ui
                        .add(DatePickerButton::new(&mut start).id_salt(&format!("{}_from", col.name)))
                        .changed();
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("to");
                    changed |= ui
                        .add(DatePickerButton::new(&mut end).id_salt(&format!("{}_to", col.name)))
                        .changed();
                });
                if changed {
                    state
                        .filters
                        .insert(col.name.clone(), ColumnConstraint::DateRange { start, end });
                    state.refilter();
                }
            }
            ColumnConstraint::Values { search, selected } => {
                let ColumnProfile::Text { unique } = &col.profile else {
                    return;
                };

                let mut search_text = search.clone();
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Search");
                    if ui.text_edit_singleline(&mut search_text).changed() {
                        state.set_category_search(&col.name, search_text.clone());
                    }
                });

                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all_matching(&col.name);
                    }
                    if ui.small_button("None").clicked() {
                        state.select_no_values(&col.name);
                    }
                });

                for value in matching_values(unique, &search_text) {
                    let mut checked = selected.contains(&value);
                    if ui.checkbox(&mut checked, &value).changed() {
                        state.toggle_category(&col.name, &value);
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Load actions
// ---------------------------------------------------------------------------

/// Pick one or more CSV files and load them as the new dataset.
pub fn open_csv_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open CSV data")
        .add_filter("CSV", &["csv"])
        .pick_files();

    let Some(paths) = files else {
        return;
    };
    if paths.is_empty() {
        return;
    }

    match loader::load_files(&paths) {
        Ok(outcome) => {
            log::info!(
                "loaded {} rows from {} file(s) with columns {:?}",
                outcome.dataset.len(),
                paths.len(),
                outcome.dataset.column_names()
            );
            state.ingest(outcome);
        }
        Err(e) => {
            log::error!("failed to load files: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Download and load the configured sample dataset.
pub fn load_sample(state: &mut AppState) {
    let url = state.config.sample_url.clone();
    match loader::fetch_sample(&url) {
        Ok(outcome) => {
            log::info!("loaded sample dataset ({} rows) from {url}", outcome.dataset.len());
            state.ingest(outcome);
        }
        Err(e) => {
            log::error!("failed to fetch sample dataset: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
