use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::export;
use crate::data::model::Dataset;
use crate::state::AppState;
use crate::ui::plot::{self, ChartKind};

/// Rows shown in the head preview, mirroring a `head()` call.
const PREVIEW_ROWS: usize = 5;
/// Cap on the filtered table; the full view is still exported.
const MAX_TABLE_ROWS: usize = 50;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Waiting for file upload or sample dataset selection…");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(ds) = &state.dataset {
                ui.heading("Data Preview");
                let head: Vec<usize> = (0..ds.len().min(PREVIEW_ROWS)).collect();
                data_table(ui, "preview_table", ds, &head);
                ui.separator();

                ui.heading("Data Summary");
                summary_grid(ui, ds);
                ui.separator();

                ui.heading("Filtered Data");
                let shown = state.visible_indices.len().min(MAX_TABLE_ROWS);
                data_table(ui, "filtered_table", ds, &state.visible_indices[..shown]);
                if state.visible_indices.len() > MAX_TABLE_ROWS {
                    ui.label(format!(
                        "Showing first {MAX_TABLE_ROWS} of {} filtered rows.",
                        state.visible_indices.len()
                    ));
                }
                ui.separator();
            }

            plot_section(ui, state);
        });
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn data_table(ui: &mut Ui, id: &str, dataset: &Dataset, indices: &[usize]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(60.0), dataset.columns.len())
            .header(20.0, |mut header| {
                for col in &dataset.columns {
                    header.col(|ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|mut body| {
                for &i in indices {
                    body.row(18.0, |mut row| {
                        for cell in &dataset.rows[i] {
                            row.col(|ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                }
            });
    });
}

fn summary_grid(ui: &mut Ui, dataset: &Dataset) {
    let summaries = dataset.numeric_summaries();
    if summaries.is_empty() {
        ui.label("No numeric columns.");
        return;
    }
    egui::Grid::new("summary_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for title in ["column", "count", "mean", "std", "min", "max"] {
                ui.strong(title);
            }
            ui.end_row();
            for s in &summaries {
                ui.label(&s.column);
                ui.label(s.count.to_string());
                ui.label(format!("{:.4}", s.mean));
                ui.label(format!("{:.4}", s.std));
                ui.label(format!("{}", s.min));
                ui.label(format!("{}", s.max));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Plot controls, chart, and export
// ---------------------------------------------------------------------------

fn plot_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plot Data");

    let column_names: Vec<String> = state
        .dataset
        .as_ref()
        .map(|d| d.column_names())
        .unwrap_or_default();

    egui::ComboBox::from_label("X-axis column")
        .selected_text(state.chart.x_column.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for name in &column_names {
                ui.selectable_value(&mut state.chart.x_column, name.clone(), name);
            }
        });
    egui::ComboBox::from_label("Y-axis column")
        .selected_text(state.chart.y_column.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for name in &column_names {
                ui.selectable_value(&mut state.chart.y_column, name.clone(), name);
            }
        });
    egui::ComboBox::from_label("Chart Type")
        .selected_text(state.chart.kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut state.chart.kind, kind, kind.label());
            }
        });
    if state.chart.kind == ChartKind::Histogram {
        ui.label(RichText::new("The histogram bins the Y-axis column.").weak());
    }

    if ui.button("Generate Plot").clicked() {
        state.show_chart = true;
    }

    if state.show_chart {
        let result = match &state.dataset {
            Some(ds) => plot::render_chart(ui, ds, &state.visible_indices, &state.chart),
            None => Ok(()),
        };
        if let Err(e) = result {
            state.status_message = Some(format!("Plot error: {e}"));
            state.show_chart = false;
        }
    }

    ui.add_space(8.0);
    if ui.button("Download Filtered Data as CSV").clicked() {
        download_filtered(state);
    }
}

fn download_filtered(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name("filtered_data.csv")
        .save_file()
    else {
        return;
    };

    let result = match &state.dataset {
        Some(ds) => export::write_filtered_csv(&path, ds, &state.visible_indices),
        None => Ok(()),
    };
    match result {
        Ok(()) => log::info!(
            "exported {} rows to {}",
            state.visible_indices.len(),
            path.display()
        ),
        Err(e) => {
            log::error!("export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
